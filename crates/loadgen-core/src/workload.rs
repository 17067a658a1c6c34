//! Synthetic CPU-bound workloads
//!
//! The controller only needs something that burns CPU for a roughly fixed
//! amount of time per iteration and returns; it measures the wall-clock
//! duration itself. The builtin kernel is a Dhrystone-flavored mix of
//! record, array, string, and integer operations.

use std::hint::black_box;

/// An opaque unit of synthetic work.
///
/// Contract: `execute_burst` is a deterministic, CPU-bound computation with
/// no I/O that consumes a roughly fixed amount of CPU time per iteration
/// count and then returns. Implementations must not sleep or block on
/// anything other than the CPU.
pub trait Workload: Send {
    fn execute_burst(&self, iterations: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ident {
    One,
    Two,
    Three,
}

struct Record {
    discr: Ident,
    enum_comp: Ident,
    int_comp: i32,
    string_comp: [u8; 30],
}

/// Builtin Dhrystone-flavored synthetic kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dhrystone;

impl Dhrystone {
    fn compare_chars(ch_1: u8, ch_2: u8, int_glob: &mut i32) -> bool {
        // func-2 analogue: scan for a matching character pair
        let mut ch_index = ch_1;
        let mut found = false;
        while ch_index <= ch_2 {
            if ch_index == b'A' + 2 {
                found = true;
                *int_glob += 1;
            }
            ch_index += 1;
        }
        found
    }
}

impl Workload for Dhrystone {
    fn execute_burst(&self, iterations: u32) {
        let mut int_glob: i32 = 0;
        let mut bool_glob = false;
        let mut ch_1_glob = b'A';
        let mut arr_1 = [0i32; 50];
        let mut arr_2 = [[0i32; 50]; 50];
        arr_2[8][7] = 10;

        let mut record = Record {
            discr: Ident::One,
            enum_comp: Ident::Three,
            int_comp: 40,
            string_comp: *b"DHRYSTONE PROGRAM, SOME STRING",
        };
        let string_1 = *b"DHRYSTONE PROGRAM, 1'ST STRING";
        let string_2 = *b"DHRYSTONE PROGRAM, 2'ND STRING";

        for run_index in 1..=iterations as i32 {
            let int_1 = 2;
            let mut int_2 = 3 * run_index;
            let mut int_3 = 0;

            if Self::compare_chars(ch_1_glob, b'C', &mut int_glob) {
                int_2 += int_3;
            }
            // proc-7 analogue
            int_3 = int_2 + int_1 + 5;

            // proc-8 analogue: array churn keyed off the loop indices
            let idx_1 = (int_1 + 5) as usize % 50;
            arr_1[idx_1] = int_3;
            arr_1[(idx_1 + 1) % 50] = arr_1[idx_1];
            arr_1[(idx_1 + 30) % 50] = int_1;
            for i in idx_1..idx_1 + 2 {
                arr_2[idx_1][i % 50] = arr_1[idx_1];
            }
            arr_2[idx_1][(idx_1 + 20) % 50] += 1;
            int_glob = 5;

            // proc-1 analogue: record field churn
            record.int_comp = if record.discr == Ident::One {
                int_glob + record.int_comp
            } else {
                run_index
            };
            record.enum_comp = match record.enum_comp {
                Ident::One => Ident::Two,
                Ident::Two => Ident::Three,
                Ident::Three => Ident::One,
            };

            // func-2 analogue on the strings
            bool_glob = string_1 == string_2 || record.string_comp[0] == string_1[0];
            if bool_glob {
                ch_1_glob = b'A' + (run_index % 26) as u8;
            }
            int_2 = int_2.wrapping_mul(int_3).wrapping_add(arr_2[idx_1][idx_1 % 50]);
            int_glob = int_glob.wrapping_add(int_2 % 7);
        }

        // Keep the optimizer from proving the burst dead
        black_box((int_glob, bool_glob, ch_1_glob, arr_1[7], arr_2[8][7], record.int_comp));
    }
}
