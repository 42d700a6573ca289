//! Test function names.

use gt_core::FunctionSignature;

/// The base test name of a function.
///
/// `Add` → `TestAdd`, `sum` → `Testsum`, `(*Calc).Add` → `TestCalc_Add`.
pub fn test_name(function: &FunctionSignature) -> String {
    match &function.receiver {
        Some(receiver) => format!("Test{}_{}", receiver.type_name, function.name),
        None => format!("Test{}", function.name),
    }
}

/// Returns `candidate`, or the first of `candidate_2`, `candidate_3`, …
/// for which `is_taken` is false.
///
/// # Examples
///
/// ```
/// use gt_gen::next_free_name;
///
/// let taken = ["TestAdd", "TestAdd_2"];
/// assert_eq!(next_free_name("TestAdd", |n| taken.contains(&n)), "TestAdd_3");
/// assert_eq!(next_free_name("TestSub", |n| taken.contains(&n)), "TestSub");
/// ```
pub fn next_free_name(candidate: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(candidate) {
        return candidate.to_owned();
    }
    (2_usize..)
        .map(|n| format!("{candidate}_{n}"))
        .find(|name| !is_taken(name))
        .unwrap_or_else(|| candidate.to_owned())
}
