use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vfs_core::scan;
use vfs_fs::constants::ROOT_DIR_ID;
use vfs_test_utils::TestVfs;

/// 20 directories of 50 files, with every tenth file drifted.
fn drifted_vfs() -> TestVfs {
    let vfs = TestVfs::new();
    for d in 0..20 {
        let dir = format!("d{d}");
        vfs.both_dir(&dir, ROOT_DIR_ID, &format!("dir{d}"));
        for f in 0..50 {
            let id = format!("f{d}-{f}");
            vfs.both_file(&id, &dir, &format!("file{f}"), "sum");
            if f % 10 == 0 {
                vfs.rewrite_in_store(&id, "drift");
            }
        }
    }
    vfs
}

fn scan_benchmark(c: &mut Criterion) {
    let vfs = drifted_vfs();
    c.bench_function("scan (1000 files, 10% drift)", |b| {
        b.iter(|| black_box(scan(&vfs.index, &vfs.store).unwrap().len()))
    });
}

criterion_group!(benches, scan_benchmark);
criterion_main!(benches);
