//! Language alternatives of alt-text arrays

use super::tree::{XmpNode, X_DEFAULT};

/// How an alt-text item was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LangMatch {
    /// The array is empty
    NoValues,
    /// Exact match on the specific language
    Specific(usize),
    /// Exactly one item of the generic language family
    SingleGeneric(usize),
    /// Several items of the generic family; the first is chosen
    MultipleGeneric(usize),
    /// Fell back to `x-default`
    XDefault(usize),
    /// Fell back to the first item
    FirstItem(usize),
}

impl LangMatch {
    pub(crate) fn index(self) -> Option<usize> {
        match self {
            LangMatch::NoValues => None,
            LangMatch::Specific(i)
            | LangMatch::SingleGeneric(i)
            | LangMatch::MultipleGeneric(i)
            | LangMatch::XDefault(i)
            | LangMatch::FirstItem(i) => Some(i),
        }
    }
}

/// Pick the item for `specific`, falling back to the `generic` family, then
/// `x-default`, then the first item. Languages compare case-insensitively.
pub(crate) fn choose_localized(
    items: &[XmpNode],
    generic: Option<&str>,
    specific: &str,
) -> LangMatch {
    if items.is_empty() {
        return LangMatch::NoValues;
    }
    let specific = specific.to_ascii_lowercase();
    let langs: Vec<Option<String>> = items.iter().map(XmpNode::lang).collect();

    if let Some(i) = langs.iter().position(|l| l.as_deref() == Some(specific.as_str())) {
        return LangMatch::Specific(i);
    }

    if let Some(generic) = generic.filter(|g| !g.is_empty()) {
        let generic = generic.to_ascii_lowercase();
        let family = format!("{}-", generic);
        let mut members = langs.iter().enumerate().filter(|(_, l)| {
            l.as_deref()
                .is_some_and(|l| l == generic || l.starts_with(&family))
        });
        if let Some((first, _)) = members.next() {
            return if members.next().is_some() {
                LangMatch::MultipleGeneric(first)
            } else {
                LangMatch::SingleGeneric(first)
            };
        }
    }

    match langs.iter().position(|l| l.as_deref() == Some(X_DEFAULT)) {
        Some(i) => LangMatch::XDefault(i),
        None => LangMatch::FirstItem(0),
    }
}

fn x_default_index(array: &XmpNode) -> Option<usize> {
    array
        .children
        .iter()
        .position(|item| item.lang().as_deref() == Some(X_DEFAULT))
}

/// Set the value for `specific`, keeping `x-default` in step
///
/// `x-default` follows a changed item when it held the same value, and is
/// created as the first item when the array ends up with a single language.
pub(crate) fn set_localized(
    array: &mut XmpNode,
    generic: Option<&str>,
    specific: &str,
    value: &str,
) {
    let x_default = x_default_index(array);

    if specific.eq_ignore_ascii_case(X_DEFAULT) {
        match x_default {
            Some(xd) => {
                let old = std::mem::replace(&mut array.children[xd].value, value.to_string());
                for (i, item) in array.children.iter_mut().enumerate() {
                    if i != xd && item.value == old {
                        item.value = value.to_string();
                    }
                }
            }
            None => array.children.insert(0, XmpNode::lang_item(X_DEFAULT, value)),
        }
        return;
    }

    let item_count = array.children.len();
    match choose_localized(&array.children, generic, specific) {
        LangMatch::NoValues => {
            array.children.push(XmpNode::lang_item(X_DEFAULT, value));
            array.children.push(XmpNode::lang_item(specific, value));
            return;
        }
        LangMatch::Specific(i) | LangMatch::SingleGeneric(i) => {
            if let Some(xd) = x_default.filter(|xd| *xd != i) {
                if array.children[xd].value == array.children[i].value {
                    array.children[xd].value = value.to_string();
                }
            }
            array.children[i].value = value.to_string();
        }
        LangMatch::XDefault(xd) => {
            if item_count == 1 {
                array.children[xd].value = value.to_string();
            }
            array.children.push(XmpNode::lang_item(specific, value));
        }
        LangMatch::MultipleGeneric(_) | LangMatch::FirstItem(_) => {
            array.children.push(XmpNode::lang_item(specific, value));
        }
    }

    if x_default.is_none() && array.children.len() == 1 {
        array.children.insert(0, XmpNode::lang_item(X_DEFAULT, value));
    }
}

/// Remove the item of exactly `specific`
///
/// Removing `x-default` also removes the first item sharing its value, and
/// removing another item also removes `x-default` when the values match.
pub(crate) fn delete_localized(array: &mut XmpNode, generic: Option<&str>, specific: &str) {
    let LangMatch::Specific(i) = choose_localized(&array.children, generic, specific) else {
        return;
    };
    let removed = array.children.remove(i);
    let twin = if removed.lang().as_deref() == Some(X_DEFAULT) {
        array.children.iter().position(|item| item.value == removed.value)
    } else {
        x_default_index(array).filter(|xd| array.children[*xd].value == removed.value)
    };
    if let Some(twin) = twin {
        array.children.remove(twin);
    }
}
