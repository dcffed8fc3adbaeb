// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use loc_stats::{
    CardOptions, LanguageTotals, MarkdownOptions, full_section, parse_engine_output, render_card,
    replace_region,
};

fn sample_totals(languages: usize,) -> LanguageTotals
{
    LanguageTotals::from_iter(
        (0..languages).map(|i| (format!("Lang{i}"), (i as u64 + 1) * 1_337,),),
    )
}

fn benchmark_full_section(c: &mut Criterion,)
{
    let totals = sample_totals(40,);
    let options = MarkdownOptions::default();

    c.bench_function("full_section_40_languages", |b| {
        b.iter(|| full_section(black_box(&totals,), black_box(&options,),),)
    },);
}

fn benchmark_render_card(c: &mut Criterion,)
{
    let totals = sample_totals(40,);
    let options = CardOptions::for_user("octocat",);

    c.bench_function("render_card_40_languages", |b| {
        b.iter(|| render_card(black_box(&totals,), black_box(&options,),),)
    },);
}

fn benchmark_engine_output(c: &mut Criterion,)
{
    let mut output = String::from("{",);
    for i in 0..200 {
        if i > 0 {
            output.push(',',);
        }
        output.push_str(&format!("\"Lang{i}\": {}", i * 911),);
    }
    output.push('}',);

    c.bench_function("parse_engine_output_200_languages", |b| {
        b.iter(|| parse_engine_output(black_box(&output,),).expect("parse failed",),)
    },);
}

fn benchmark_replace_region(c: &mut Criterion,)
{
    let mut document = String::from("# Profile\n\n",);
    for i in 0..500 {
        document.push_str(&format!("Paragraph {i} of hand-written content.\n"),);
    }
    document.push_str("<!-- LOC-STATS:START -->\nold\n<!-- LOC-STATS:END -->\n",);
    let section = full_section(&sample_totals(8,), &MarkdownOptions::default(),);

    c.bench_function("replace_region_large_document", |b| {
        b.iter(|| replace_region(black_box(&document,), black_box(&section,),),)
    },);
}

criterion_group!(
    benches,
    benchmark_full_section,
    benchmark_render_card,
    benchmark_engine_output,
    benchmark_replace_region
);
criterion_main!(benches);
