//! Native routines - pure, stateless numeric and string operations
//!
//! Nothing in here knows about the host runtime or its lock. The binding
//! layer decides how and when these run.

use std::hint::black_box;
use std::io::{self, Write};

/// Recursive factorial.
///
/// Overflow wraps; callers wanting exact results must stay within `n <= 20`.
pub fn factorial(n: i64) -> i64 {
    if n < 2 {
        return 1;
    }
    n.wrapping_mul(factorial(n - 1))
}

/// Recursive Fibonacci with `fibonacci(0) == fibonacci(1) == 1`.
///
/// Exponential time, no memoization. This is the CPU-bound call used to
/// demonstrate releasing the global lock.
pub fn fibonacci(n: i64) -> i64 {
    if n < 2 {
        return 1;
    }
    fibonacci(n - 2).wrapping_add(fibonacci(n - 1))
}

/// Reverse a buffer in place by swapping from both ends toward the middle.
#[inline]
pub fn reverse<T>(buf: &mut [T]) -> &mut [T] {
    if buf.len() > 1 {
        let (mut p, mut q) = (0, buf.len() - 1);
        while p < q {
            buf.swap(p, q);
            p += 1;
            q -= 1;
        }
    }
    buf
}

/// Duplicate `s` into an owned buffer and reverse the duplicate.
///
/// Works on chars, so multi-byte text stays valid UTF-8.
pub fn reversed(s: &str) -> String {
    let mut dupe: Vec<char> = s.chars().collect();
    reverse(&mut dupe);
    dupe.into_iter().collect()
}

/// Burn CPU counting `n` down to zero. No output, no result.
pub fn countdown(n: i32) {
    let mut n = black_box(n);
    while n > 0 {
        n = black_box(n - 1);
    }
}

/// Write the fixed demonstration text.
pub fn demo<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "4! == {}", factorial(4))?;
    writeln!(out, "8! == {}", factorial(8))?;
    writeln!(out, "12! == {}", factorial(12))?;
    writeln!(out, "reversing 'abcdef', we get '{}'", reversed("abcdef"))?;
    writeln!(out, "reversing 'madam', we get '{}'", reversed("madam"))?;
    Ok(())
}
