//! Cross-crate tests exercising compiled automata through the runtime's
//! reader operations.

#[cfg(test)]
mod agreement;
#[cfg(test)]
mod scanning;
