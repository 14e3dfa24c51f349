pub mod analyzer;
pub mod detection_formatter;
pub mod rounding;
pub mod truck_load;

#[cfg(test)]
pub(crate) mod testing;
