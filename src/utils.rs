/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Small helpers shared by every collection in the crate.

use core::mem;

/// Swaps `*dst` for `src` without requiring `T: Default`.
///
/// Used by the HAMT and red-black tree engines to replace a node in place
/// during compression/repair steps, where we only have `&mut Node` and a
/// freshly built replacement.
#[inline]
pub fn replace<T>(dst: &mut T, src: T) {
    let _ = mem::replace(dst, src);
}

/// The hash builder used when a collection does not have one supplied
/// explicitly.
///
/// With the `std` feature this is [`std::collections::hash_map::RandomState`],
/// matching the standard library's own default and picking up its
/// collision-resistant random seeding. Without `std` (pure `alloc`) we fall
/// back to a fixed-seed FNV-1a builder: deterministic, not DoS-resistant,
/// but sufficient for a `no_std` embedding that has no `getrandom` source.
#[cfg(feature = "std")]
pub type DefaultBuildHasher = std::collections::hash_map::RandomState;

#[cfg(not(feature = "std"))]
pub type DefaultBuildHasher = FnvBuildHasher;

#[cfg(not(feature = "std"))]
#[derive(Clone, Default, Debug)]
pub struct FnvBuildHasher;

#[cfg(not(feature = "std"))]
impl core::hash::BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> FnvHasher {
        FnvHasher(0xcbf2_9ce4_8422_2325)
    }
}

#[cfg(not(feature = "std"))]
#[derive(Debug)]
pub struct FnvHasher(u64);

#[cfg(not(feature = "std"))]
impl core::hash::Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
}

/// Folds a 64-bit hash down to 32 bits for the HAMT, which indexes a fixed
/// 32-way (5-bit fragment) trie and stores the collision key as a genuine
/// 32-bit value (`spec.md` §3.1: "a full 32-bit hash").
///
/// XORing the halves rather than truncating keeps entropy from the high
/// bits of a good 64-bit hasher instead of discarding it.
#[inline]
pub fn fold_to_u32(h: u64) -> u32 {
    ((h >> 32) as u32) ^ (h as u32)
}
