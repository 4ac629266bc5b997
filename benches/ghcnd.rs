use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ghcnd::{convert_dly, Reshaper, StartEndDate};

const ELEMENTS: [&str; 5] = ["PRCP", "SNOW", "SNWD", "TMAX", "TMIN"];

fn synthetic_archive(years: i32) -> Vec<u8> {
    let mut archive = String::new();
    for year in 1990..1990 + years {
        for month in 1..=12u32 {
            for (index, element) in ELEMENTS.iter().enumerate() {
                archive.push_str(&format!("USW00014739{:04}{:02}{:<4}", year, month, element));
                for day in 0..31 {
                    let value = (year + month as i32 * 7 + day * 3 + index as i32) % 400 - 50;
                    archive.push_str(&format!("{:>5}  W", value));
                }
                archive.push('\n');
            }
        }
    }
    archive.into_bytes()
}

fn bench_convert(c: &mut Criterion) {
    let input = synthetic_archive(30);
    let reshaper = Reshaper::default();
    c.bench_function("convert_dly_30_years", |b| {
        b.iter(|| convert_dly(black_box(&input), &reshaper))
    });

    let range = StartEndDate::new(
        chrono::NaiveDate::from_ymd_opt(1985, 1, 1).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    );
    let reindexed = Reshaper::builder().date_range(range).build();
    c.bench_function("convert_dly_30_years_reindexed", |b| {
        b.iter(|| convert_dly(black_box(&input), &reindexed))
    });
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
