use benchcmp::{
    black_box, Benchmark, BenchmarkBuilder, Config, PeakMemAlloc, RawBuffer, RawPtr,
    INSTRUMENTED_SYSTEM,
};

#[global_allocator]
pub static GLOBAL: &PeakMemAlloc<std::alloc::System> = &INSTRUMENTED_SYSTEM;

/// Deterministic pseudo random floats in [0, 1_000_000).
fn random_floats(len: usize, mut seed: u64) -> Vec<f32> {
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 40) as f32 / (1u64 << 24) as f32 * 1_000_000.0
        })
        .collect()
}

fn newton_sqrt(x: f32) -> f32 {
    let mut guess = x / 2.0;
    for _ in 0..15 {
        guess = 0.5 * (guess + x / guess);
    }
    guess
}

fn sqrt(x: &mut f32) -> f32 {
    black_box(*x).sqrt()
}

fn newton(x: &mut f32) -> f32 {
    newton_sqrt(black_box(*x))
}

fn mean_sqrt(values: &mut Vec<f32>) -> f32 {
    values.iter().map(|x| x.sqrt()).sum::<f32>() / values.len() as f32
}

fn mean_newton(values: &mut Vec<f32>) -> f32 {
    values.iter().map(|x| newton_sqrt(*x)).sum::<f32>() / values.len() as f32
}

/// Sorts in place and returns the number of comparisons.
fn std_sort(values: &mut [f32]) -> usize {
    let mut comparisons = 0;
    values.sort_by(|a, b| {
        comparisons += 1;
        a.total_cmp(b)
    });
    comparisons
}

fn selection_sort(values: &mut [f32]) -> usize {
    let mut comparisons = 0;
    for i in 0..values.len() {
        let mut min = i;
        for j in i + 1..values.len() {
            comparisons += 1;
            if values[j] < values[min] {
                min = j;
            }
        }
        values.swap(i, min);
    }
    comparisons
}

fn comparison_diff(reference: &usize, comparisons: &usize) -> i64 {
    *comparisons as i64 - *reference as i64
}

fn main() {
    let config = Config::new();
    let input = random_floats(1, 7)[0];

    println!("\nSimple benchmark\n");
    let mut simple = BenchmarkBuilder::new(1_000_000)
        .config(config.clone())
        .value(sqrt, |a: &f32, b: &f32| a - b, (input,))
        .unwrap();
    simple.insert(newton, "Newton's Method").unwrap();
    simple.run().unwrap();
    simple.print();

    println!("\nContainer benchmark\n");
    let values = random_floats(4096, 42);
    let mut container = BenchmarkBuilder::new(1000)
        .config(config.clone())
        .track_memory(GLOBAL)
        .value(mean_sqrt, |a: &f32, b: &f32| a - b, (values.clone(),))
        .unwrap();
    container.insert(mean_newton, "Newton's Method").unwrap();
    container.run().unwrap();
    container.print();

    println!("\nContainer sort, the input must stay unsorted\n");
    let unsorted = random_floats(512, 1337);
    let mut container_sort = BenchmarkBuilder::new(100)
        .config(config.clone())
        .value(
            |v: &mut Vec<f32>| std_sort(v),
            comparison_diff,
            (unsorted.clone(),),
        )
        .unwrap();
    container_sort
        .insert(|v: &mut Vec<f32>| selection_sort(v), "Selection Sort")
        .unwrap();
    container_sort.run().unwrap();
    container_sort.print();

    println!("\nRaw pointer sort\n");
    let mut raw_sort = Benchmark::new(
        |buffer: &mut RawBuffer<f32>, _: &mut usize| std_sort(buffer),
        comparison_diff,
        100,
        (RawPtr::from_slice(&unsorted), unsorted.len()),
    )
    .unwrap();
    raw_sort
        .insert(
            |buffer: &mut RawBuffer<f32>, len: &mut usize| selection_sort(&mut buffer[..*len]),
            "Selection Sort",
        )
        .unwrap();
    raw_sort.run().unwrap();
    raw_sort.print();
}
