//! File handles of the memory engine
//!
//! There are no container handlers here. Packets put into a file are kept in
//! a store keyed by path and handed back when the same path is opened again.

use super::tree::Packet;
use crate::files::format::{FileType, FormatFlags};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// State behind a file handle
#[derive(Debug, Default)]
pub(crate) struct OpenFile {
    /// Set while a file is open
    pub(crate) path: Option<PathBuf>,
    pub(crate) options: u32,
    pub(crate) format: Option<FileType>,
    /// Packet read at open, replaced by `put_xmp`
    pub(crate) packet: Option<Packet>,
    /// Written to the store on close
    pub(crate) pending: bool,
}

impl OpenFile {
    pub(crate) fn is_open(&self) -> bool {
        self.path.is_some()
    }

    pub(crate) fn close(&mut self) -> Option<(PathBuf, Packet)> {
        let path = self.path.take()?;
        let packet = self.packet.take();
        let pending = std::mem::take(&mut self.pending);
        self.options = 0;
        self.format = None;
        packet.filter(|_| pending).map(|packet| (path, packet))
    }
}

/// Identify a file from its leading bytes, then from its extension
pub(crate) fn detect_format(path: &Path) -> FileType {
    let mut head = [0u8; 8];
    let read = File::open(path)
        .and_then(|mut file| file.read(&mut head))
        .unwrap_or(0);
    let head = &head[..read];

    let sniffed = if head.starts_with(&[0xFF, 0xD8]) {
        Some(FileType::Jpeg)
    } else if head.starts_with(&PNG_SIGNATURE) {
        Some(FileType::Png)
    } else if head.starts_with(b"II*\0") || head.starts_with(b"MM\0*") {
        Some(FileType::Tiff)
    } else if head.starts_with(b"GIF8") {
        Some(FileType::Gif)
    } else if head.starts_with(b"%PDF") {
        Some(FileType::Pdf)
    } else if head.starts_with(b"8BPS") {
        Some(FileType::Photoshop)
    } else {
        None
    };

    sniffed.unwrap_or_else(|| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(FileType::from_extension)
            .unwrap_or(FileType::Unknown)
    })
}

/// Capabilities the memory engine claims per format
///
/// Only the formats a smart handler would exist for are listed.
pub(crate) fn handler_flags(format: FileType) -> Option<FormatFlags> {
    let embedded = FormatFlags::CAN_INJECT_XMP
        | FormatFlags::CAN_EXPAND
        | FormatFlags::CAN_REWRITE
        | FormatFlags::PREFERS_IN_PLACE
        | FormatFlags::ALLOWS_ONLY_XMP
        | FormatFlags::RETURNS_RAW_PACKET
        | FormatFlags::ALLOW_SAFE_UPDATE;
    match format {
        FileType::Jpeg | FileType::Tiff | FileType::Photoshop => {
            Some(embedded | FormatFlags::CAN_RECONCILE)
        }
        FileType::Png | FileType::Gif => Some(embedded),
        FileType::Xml => {
            Some(embedded - FormatFlags::PREFERS_IN_PLACE | FormatFlags::HANDLER_OWNS_FILE)
        }
        _ => None,
    }
}
