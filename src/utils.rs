pub fn is_power_of_two(x: usize) -> bool {
    x != 0 && (x & (x - 1)) == 0
}

pub fn align_forward(mut addr: usize, alignment: usize) -> usize {
    assert!(is_power_of_two(alignment));

    // Same as (addr % alignment) but faster as 'alignment' is a power of two
    let modulo = addr & (alignment - 1);

    if modulo != 0 {
        addr += alignment - modulo;
    }

    addr
}

/// Number of bytes `addr` has to move forward to land on `alignment`.
///
/// Always strictly less than `alignment`, which is why padding a request by
/// `alignment` bytes is enough to carve an aligned sub-range out of it.
#[inline]
pub fn alignment_shift(addr: usize, alignment: usize) -> usize {
    align_forward(addr, alignment) - addr
}

/// Integer identity of a byte range: the address of its first byte.
#[inline]
pub fn address_of(bytes: &[u8]) -> usize {
    bytes.as_ptr() as usize
}
