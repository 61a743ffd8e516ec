//! Built-in regex features.

use super::{Feature, RegexFeature};
use crate::error::{ConfigurationError, Result};
use crate::priority::BUILTIN_PRIORITIES;

/// Names accepted by [`builtin_feature`].
pub const BUILTIN_NAMES: [&str; 4] = ["Number", "PhoneNumber", "Date", "PESEL"];

/// Numbers and simple numeric comparisons such as `<=10` or `12,5`.
const NUMBER_CORE: &str = r"(?:|>|<|=|>=|<=)\d+(?:(?:\.|,)?)\d+";

/// Nine-digit phone numbers with an optional two-digit area code.
const PHONE_NUMBER_CORE: &str = r"\(?\d{2}\)?(?:(?:[- ])?\d){7}";

/// `dd-mm-yyyy` (any single separator) or ISO `yyyy-mm-dd`.
const DATE_CORE: &str = concat!(
    r"(0[1-9]|1[0-9]|2[0-9]|3[0-1])(-|.|/)(0[1-9]|1[0-2])(-|.|/)([12][90][0-9][0-9])",
    "|",
    r"([12][90][0-9][0-9])-(0[1-9]|1[0-2])-(0[1-9]|1[0-9]|2[0-9]|3[0-1])",
);

/// Eleven-digit national identification number.
const PESEL_CORE: &str = r"\d{11}";

fn priority(name: &str) -> i64 {
    BUILTIN_PRIORITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map_or(0, |&(_, p)| p)
}

/// Build one feature of the built-in catalog by name.
pub fn builtin_feature(name: &str) -> Result<RegexFeature> {
    let (core, before, after) = match name {
        "Number" => (NUMBER_CORE, r"\s|^", r"\s|$"),
        "PhoneNumber" => (PHONE_NUMBER_CORE, r"\s|^|:", r"\s|$"),
        "Date" => (DATE_CORE, r"\s|^|:", r"\s|$|,|;"),
        "PESEL" => (PESEL_CORE, r"\s|^|:", r"\s|$|,|;"),
        other => return Err(ConfigurationError::UnknownBuiltin(other.to_string()).into()),
    };
    RegexFeature::new(name, core, before, after, priority(name))
}

/// The whole built-in catalog, in [`BUILTIN_NAMES`] order.
pub fn builtin_features() -> Result<Vec<Box<dyn Feature>>> {
    BUILTIN_NAMES
        .iter()
        .map(|name| builtin_feature(name).map(|f| Box::new(f) as Box<dyn Feature>))
        .collect()
}
