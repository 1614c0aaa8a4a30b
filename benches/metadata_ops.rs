use criterion::{criterion_group, criterion_main, Criterion};
use libxmp::core::namespace::{XMP_NS_DC, XMP_NS_EXIF, XMP_NS_XMP};
use libxmp::{Context, PropFlags, XmpMeta};
use std::hint::black_box;

fn create_populated_meta(ctx: &Context) -> XmpMeta<'_> {
    let mut meta = XmpMeta::new(ctx).unwrap();
    meta.set_property(XMP_NS_XMP, "CreatorTool", "TestApp", PropFlags::empty())
        .unwrap();
    meta.set_property(
        XMP_NS_XMP,
        "CreateDate",
        "2006-04-25T15:32:01+02:00",
        PropFlags::empty(),
    )
    .unwrap();
    meta.set_property_i32(XMP_NS_EXIF, "PixelXDimension", 200, PropFlags::empty())
        .unwrap();

    for i in 0..10 {
        meta.append_array_item(
            XMP_NS_DC,
            "subject",
            PropFlags::VALUE_IS_ARRAY,
            &format!("item{}", i),
            PropFlags::empty(),
        )
        .unwrap();
    }

    meta
}

fn bench_set_property(c: &mut Criterion) {
    let ctx = Context::memory().unwrap();
    c.bench_function("set_property", |b| {
        b.iter(|| {
            let mut meta = XmpMeta::new(&ctx).unwrap();
            meta.set_property(
                black_box(XMP_NS_XMP),
                black_box("CreatorTool"),
                black_box("TestApp"),
                PropFlags::empty(),
            )
            .unwrap();
        });
    });
}

fn bench_get_property(c: &mut Criterion) {
    let ctx = Context::memory().unwrap();
    let meta = create_populated_meta(&ctx);
    c.bench_function("get_property", |b| {
        b.iter(|| {
            let _value =
                black_box(&meta).get_property(black_box(XMP_NS_XMP), black_box("CreatorTool"));
        });
    });
}

fn bench_get_property_i32(c: &mut Criterion) {
    let ctx = Context::memory().unwrap();
    let meta = create_populated_meta(&ctx);
    c.bench_function("get_property_i32", |b| {
        b.iter(|| {
            let _value = black_box(&meta)
                .get_property_i32(black_box(XMP_NS_EXIF), black_box("PixelXDimension"));
        });
    });
}

fn bench_get_array_item(c: &mut Criterion) {
    let ctx = Context::memory().unwrap();
    let meta = create_populated_meta(&ctx);
    c.bench_function("get_array_item", |b| {
        b.iter(|| {
            let _value = black_box(&meta).get_array_item(
                black_box(XMP_NS_DC),
                black_box("subject"),
                black_box(5),
            );
        });
    });
}

fn bench_count_array_items(c: &mut Criterion) {
    let ctx = Context::memory().unwrap();
    let meta = create_populated_meta(&ctx);
    c.bench_function("count_array_items", |b| {
        b.iter(|| {
            let _count =
                black_box(&meta).count_array_items(black_box(XMP_NS_DC), black_box("subject"));
        });
    });
}

fn bench_get_localized_text(c: &mut Criterion) {
    let ctx = Context::memory().unwrap();
    let mut meta = XmpMeta::new(&ctx).unwrap();
    meta.set_localized_text(XMP_NS_DC, "title", None, "x-default", "Test Title", PropFlags::empty())
        .unwrap();

    c.bench_function("get_localized_text", |b| {
        b.iter(|| {
            let _value = black_box(&meta).get_localized_text(
                black_box(XMP_NS_DC),
                black_box("title"),
                black_box(Some("en")),
                black_box("en-US"),
            );
        });
    });
}

fn bench_iterate(c: &mut Criterion) {
    let ctx = Context::memory().unwrap();
    let meta = create_populated_meta(&ctx);
    c.bench_function("iterate", |b| {
        b.iter(|| {
            let count = black_box(&meta).iter().unwrap().count();
            black_box(count);
        });
    });
}

criterion_group!(
    benches,
    bench_set_property,
    bench_get_property,
    bench_get_property_i32,
    bench_get_array_item,
    bench_count_array_items,
    bench_get_localized_text,
    bench_iterate
);
criterion_main!(benches);
