use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use iris_mlp::{Dataset, ModelConfig, TrainingOptions, build_classifier, train};

struct CountingAlloc {
    allocs: AtomicUsize,
    reallocs: AtomicUsize,
    deallocs: AtomicUsize,
    bytes: AtomicUsize,
}

impl CountingAlloc {
    const fn new() -> Self {
        Self {
            allocs: AtomicUsize::new(0),
            reallocs: AtomicUsize::new(0),
            deallocs: AtomicUsize::new(0),
            bytes: AtomicUsize::new(0),
        }
    }

    fn reset(&self) {
        self.allocs.store(0, Ordering::Relaxed);
        self.reallocs.store(0, Ordering::Relaxed);
        self.deallocs.store(0, Ordering::Relaxed);
        self.bytes.store(0, Ordering::Relaxed);
    }

    fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot {
            allocs: self.allocs.load(Ordering::Relaxed),
            reallocs: self.reallocs.load(Ordering::Relaxed),
            deallocs: self.deallocs.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }

    fn alloc_events(&self) -> usize {
        self.allocs.load(Ordering::Relaxed) + self.reallocs.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AllocSnapshot {
    allocs: usize,
    reallocs: usize,
    deallocs: usize,
    bytes: usize,
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.allocs.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(layout.size(), Ordering::Relaxed);
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        self.allocs.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(layout.size(), Ordering::Relaxed);
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.deallocs.fetch_add(1, Ordering::Relaxed);
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        self.reallocs.fetch_add(1, Ordering::Relaxed);
        // Approximate accounting: record the new size.
        self.bytes.fetch_add(new_size, Ordering::Relaxed);
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc::new();

fn make_dataset(len: usize) -> Dataset {
    let mut inputs = Vec::with_capacity(len * 4);
    let mut targets = Vec::with_capacity(len * 3);
    for i in 0..len {
        let class = i % 3;
        inputs.extend([5.0 + class as f32, 3.0, 1.5 + 2.0 * class as f32, 0.2 + class as f32]);
        let mut t = [0.0_f32; 3];
        t[class] = 1.0;
        targets.extend(t);
    }
    Dataset::from_flat(inputs, targets, 4, 3).unwrap()
}

#[test]
fn training_does_not_allocate_per_step() {
    let batch_size = 16;
    let cfg = ModelConfig::new(8, 10, 2, 0.06).unwrap();
    let opts = TrainingOptions {
        seed: 0,
        batch_size,
        shuffle: true,
    };
    let base = build_classifier(&cfg, opts.seed).unwrap();

    let train_small = make_dataset(batch_size);
    let train_large = make_dataset(batch_size * 64);

    let model_small = base.clone();
    ALLOC.reset();
    let before_small = ALLOC.snapshot();
    let small = train(model_small, &train_small, &cfg, &opts).unwrap();
    let alloc_small = ALLOC.alloc_events();
    let after_small = ALLOC.snapshot();

    let model_large = base;
    ALLOC.reset();
    let before_large = ALLOC.snapshot();
    let large = train(model_large, &train_large, &cfg, &opts).unwrap();
    let alloc_large = ALLOC.alloc_events();
    let after_large = ALLOC.snapshot();

    assert_eq!(small.1.epochs.len(), large.1.epochs.len());
    assert_eq!(
        alloc_small, alloc_large,
        "expected allocation event count to be independent of steps.\n\
small: before={before_small:?} after={after_small:?}\n\
large: before={before_large:?} after={after_large:?}"
    );
}
