//! PIN-error extraction via Pollard's lambda over the pairing target group.
//!
//! After a failed verification the server can hand out the pairing ratio
//! `e` and reference value `f` with `e = f^d`, where `d` is the signed
//! offset between the PIN the client typed and the one its token was cut
//! for. `d` is tiny, so a tame/wild kangaroo pair recovers it in a few
//! hundred group operations.

use crate::MAX_PIN;

use ark_bn254::Fq12;
use ark_ff::{CyclotomicMultSubgroup, One, PrimeField};

/// Precomputed jump count.
const JUMPS: usize = 10;

/// Tame walk length; the wild walk is capped at four times this.
const TRAP: i32 = 200;

// Quasi-random walk selector: the low eight bits of the canonical first
// tower coordinate, reduced by the jump count.
fn step(g: &Fq12) -> usize {
    (g.c0.c0.c0.into_bigint().0[0] & 0xff) as usize % JUMPS
}

/// Recover the signed PIN offset `d` with `e = f^d`, searching
/// `(-MAXPIN, MAXPIN)`. Returns 0 when the trap fails, which usually
/// means the token itself is invalid; callers must only interpret the
/// result after a failed verification.
pub fn pin_delta(e: &Fq12, f: &Fq12) -> i32 {
    // Jump table: f^(2^m) with matching distances.
    let mut table = [Fq12::one(); JUMPS];
    let mut distance = [0i32; JUMPS];
    let mut t = *f;
    let mut s = 1i32;
    for m in 0..JUMPS {
        distance[m] = s;
        table[m] = t;
        s *= 2;
        t = t.cyclotomic_square();
    }

    // Tame walk from the identity; its endpoint is the trap.
    let mut t = Fq12::one();
    let mut dn = 0i32;
    for _ in 0..TRAP {
        let i = step(&t);
        t *= table[i];
        dn += distance[i];
    }
    let mut trap_conj = t;
    trap_conj.conjugate_in_place();

    // Wild walk from e until it lands on the trap or its conjugate.
    let mut ge = *e;
    let mut steps = 0i32;
    let mut dm = 0i32;
    let mut res = 0i32;
    while dm - dn < MAX_PIN as i32 {
        steps += 1;
        if steps > 4 * TRAP {
            break;
        }
        let i = step(&ge);
        ge *= table[i];
        dm += distance[i];
        if ge == t {
            res = dm - dn;
            break;
        }
        if ge == trap_conj {
            res = dn - dm;
            break;
        }
    }
    if steps > 4 * TRAP || dm - dn >= MAX_PIN as i32 {
        // Trap failed.
        res = 0;
    }
    res
}
