use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pm_compactor::{pass4_whitespace, MinifyPipeline};
use pm_core::{SymbolTable, TransformOptions};
use pm_lexer::tokenize;
use rand::Rng;

fn generate_source(size_kb: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut src = String::from("<?php\nnamespace bench;\n\n");
    let mut i = 0;
    while src.len() < size_kb * 1024 {
        let a: u32 = rng.gen_range(0..32);
        let b: u32 = rng.gen_range(0..32);
        src.push_str(&format!(
            "/**\n * Handler {i}.\n * @priority NORMAL\n */\nfunction handler{i}($input{a}, $scale{b} = 2) {{\n    // scale the input\n    $total = count($input{a}) * $scale{b} or 0;\n    if ($total > 10 and $total < 100) {{\n        return \"total:\\n$total\" . PHP_EOL;\n    }}\n    return $total;\n}}\n\n"
        ));
        i += 1;
    }
    src
}

fn bench_minify(c: &mut Criterion) {
    let pipeline = MinifyPipeline::new(TransformOptions::default(), SymbolTable::builtin());
    for &kb in &[1usize, 10, 100] {
        let src = generate_source(kb);
        c.bench_function(&format!("minify_full_{kb}kb"), |b| {
            b.iter(|| black_box(pipeline.minify(black_box(&src))))
        });
    }
}

fn bench_whitespace_only(c: &mut Criterion) {
    let src = generate_source(10);
    c.bench_function("remove_whitespace_10kb", |b| {
        b.iter(|| black_box(pass4_whitespace::rewrite(&tokenize(black_box(&src)))))
    });
}

criterion_group!(benches, bench_minify, bench_whitespace_only);
criterion_main!(benches);
