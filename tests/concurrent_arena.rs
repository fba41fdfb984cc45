use std::collections::HashSet;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use rsarena::{Allocator, ArenaAllocator, ArenaOptions, ALIGNMENT};

const THREADS: usize = 8;
const PER_THREAD: usize = 200;

#[test]
fn concurrent_allocations_are_unique_and_aligned() {
    let allocator = ArenaAllocator::with_options(ArenaOptions::default().with_block_size(4096))
        .expect("valid options");
    let barrier = Barrier::new(THREADS);
    let addrs = Mutex::new(HashSet::new());

    thread::scope(|s| {
        for t in 0..THREADS {
            let allocator = &allocator;
            let barrier = &barrier;
            let addrs = &addrs;
            s.spawn(move || {
                let mut bufs = Vec::with_capacity(PER_THREAD);
                for i in 0..PER_THREAD {
                    let mut buf = allocator.allocate(i % 150);
                    assert_eq!(buf.addr() % ALIGNMENT, 0);
                    buf.fill(t as u8);
                    bufs.push(buf);
                }

                // everyone holds their buffers at once
                barrier.wait();
                {
                    let mut addrs = addrs.lock().unwrap();
                    for buf in &bufs {
                        assert!(addrs.insert(buf.addr()), "address handed out twice");
                    }
                }
                for buf in &bufs {
                    assert!(buf.iter().all(|b| *b == t as u8));
                }
                barrier.wait();

                for buf in bufs {
                    allocator.free(buf);
                }
            });
        }
    });

    assert_eq!(addrs.lock().unwrap().len(), THREADS * PER_THREAD);
    assert_eq!(allocator.check_size(), 0);
    assert_eq!(allocator.release_count(), 1);
}

#[test]
fn shared_allocator_survives_repeated_release_cycles() {
    let allocator = Arc::new(ArenaAllocator::new());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let allocator = allocator.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let mut buf = allocator.allocate(t * 10 + i % 64);
                    buf.fill(0x5A);
                    assert!(buf.iter().all(|b| *b == 0x5A));
                    allocator.free(buf);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // every thread frees all it takes, so at least the last free empties the arena
    assert_eq!(allocator.check_size(), 0);
    assert!(allocator.release_count() >= 1);
    assert_eq!(allocator.bytes_reserved(), 0);

    // and the allocator keeps serving after those release cycles
    let buf = allocator.allocate(64);
    assert_eq!(buf.addr() % ALIGNMENT, 0);
    allocator.free(buf);
}
