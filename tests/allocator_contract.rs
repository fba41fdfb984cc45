use rsarena::{Allocator, ArenaAllocator, HeapAllocator, Reallocated, ALIGNMENT};
use rstest::rstest;

fn arena() -> Box<dyn Allocator> {
    Box::new(ArenaAllocator::new())
}

fn heap() -> Box<dyn Allocator> {
    Box::new(HeapAllocator::new())
}

#[rstest]
#[case::arena(arena())]
#[case::heap(heap())]
fn allocations_are_cache_line_aligned(#[case] allocator: Box<dyn Allocator>) {
    let sizes = [0, 1, 33, 63, 64, 65, 127, 4097, 8192];

    let bufs: Vec<_> = sizes.iter().map(|size| allocator.allocate(*size)).collect();
    for (buf, size) in bufs.iter().zip(sizes) {
        assert_eq!(buf.len(), size);
        assert_eq!(buf.addr() % ALIGNMENT, 0, "{buf:?} is not aligned");
    }

    for buf in bufs {
        allocator.free(buf);
    }
}

#[rstest]
#[case::arena(arena())]
#[case::heap(heap())]
fn fresh_buffers_read_as_zero(#[case] allocator: Box<dyn Allocator>) {
    let buf = allocator.allocate(1000);

    assert!(buf.iter().all(|b| *b == 0));
    allocator.free(buf);
}

#[rstest]
#[case::arena(arena())]
#[case::heap(heap())]
fn reallocate_through_trait_object(#[case] allocator: Box<dyn Allocator>) {
    let mut buf = allocator.allocate(8);
    buf.copy_from_slice(b"columnar");

    let shrunk = match allocator.reallocate(3, buf) {
        Reallocated::Moved { current, previous } => {
            allocator.free(previous);
            current
        }
        Reallocated::Unchanged(_) => panic!("size changed, expected a copy"),
    };
    assert_eq!(&shrunk[..], b"col");

    let same = match allocator.reallocate(3, shrunk) {
        Reallocated::Unchanged(buf) => buf,
        Reallocated::Moved { .. } => panic!("same size must not copy"),
    };
    assert_eq!(&same[..], b"col");

    allocator.free(same);
}

#[test]
fn arena_lifecycle_scenario() {
    let allocator = ArenaAllocator::new();

    let first = allocator.allocate(10);
    assert_eq!(allocator.check_size(), 1);
    let second = allocator.allocate(11);
    assert_eq!(allocator.check_size(), 2);

    allocator.free(first);
    assert_eq!(allocator.check_size(), 1);
    assert_eq!(allocator.release_count(), 0);

    allocator.free(second);
    assert_eq!(allocator.check_size(), 0);
    assert_eq!(allocator.release_count(), 1);
}

#[test]
fn heap_and_arena_do_not_accept_each_others_buffers() {
    let arena = ArenaAllocator::new();
    let heap = HeapAllocator::new();

    let from_heap = heap.allocate(16);
    let from_arena = arena.allocate(16);

    arena.free(from_heap);
    heap.free(from_arena);

    assert_eq!(arena.check_size(), 1);
    assert_eq!(heap.check_size(), 1);
    assert_eq!(arena.release_count(), 0);
}
