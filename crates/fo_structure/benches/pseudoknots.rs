use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

use fo_structure::PairTable;
use fo_structure::ElementTree;
use fo_structure::split_pseudoknots;

pub fn pseudoknot_removal(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pseudoknots");
    let unit = "((((....[[[[..))))....]]]]..{{..((((....}}...))))..";
    let structure = unit.repeat(8);
    let pt = PairTable::try_from(structure.as_str()).unwrap();

    group.bench_function("Maximum matching", |b| {
        b.iter(|| {
            let _ = split_pseudoknots(&pt);
        });
    });

    let (nested, _) = split_pseudoknots(&pt);
    group.bench_function("Element decomposition", |b| {
        b.iter(|| {
            let _ = ElementTree::from_pair_table(&nested, &[]).unwrap();
        });
    });
}

criterion_group!(benches, pseudoknot_removal);
criterion_main!(benches);
