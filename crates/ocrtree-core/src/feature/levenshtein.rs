//! Weighted edit distance tuned for OCR confusions.
//!
//! Costs for the first 128 code points come from a [`CostTable`]. Polish
//! diacritic letters are linked to their base letter: substituting one for
//! the other costs [`DIACRITIC_LINK_COST`], and any other operation on a
//! linked letter costs the same as on its base letter plus that amount. All
//! remaining characters cost 1.0 per operation.

use crate::error::ConfigurationError;

/// Number of code points covered by a cost table.
pub const TABLE_SIZE: usize = 128;

/// Extra cost of operating on a diacritic letter instead of its base letter.
pub const DIACRITIC_LINK_COST: f64 = 0.1;

const DIACRITIC_LINKS: [(char, char); 18] = [
    ('Ą', 'A'),
    ('ą', 'a'),
    ('Ę', 'E'),
    ('ę', 'e'),
    ('Ł', 'L'),
    ('ł', 'l'),
    ('Ć', 'C'),
    ('ć', 'c'),
    ('Ń', 'N'),
    ('ń', 'n'),
    ('Ó', 'O'),
    ('ó', 'o'),
    ('Ś', 'S'),
    ('ś', 's'),
    ('Ź', 'Z'),
    ('ź', 'z'),
    ('Ż', 'Z'),
    ('ż', 'z'),
];

// Punctuation OCR engines tend to hallucinate or drop.
const CHEAP_PUNCTUATION: [char; 2] = ['.', ','];
const CHEAP_PUNCTUATION_COST: f64 = 0.5;

fn base_letter(c: char) -> Option<char> {
    DIACRITIC_LINKS
        .iter()
        .find(|(linked, _)| *linked == c)
        .map(|&(_, base)| base)
}

fn table_index(c: char) -> Option<usize> {
    let code = c as usize;
    (code < TABLE_SIZE).then_some(code)
}

/// Per-character operation costs for the ASCII range.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    insert: Vec<f64>,
    delete: Vec<f64>,
    substitute: Vec<Vec<f64>>,
}

impl Default for CostTable {
    /// Unit costs, except that inserting or deleting `.` and `,` costs 0.5.
    fn default() -> Self {
        let mut insert = vec![1.0; TABLE_SIZE];
        for c in CHEAP_PUNCTUATION {
            insert[c as usize] = CHEAP_PUNCTUATION_COST;
        }
        let delete = insert.clone();
        let substitute = (0..TABLE_SIZE)
            .map(|a| {
                (0..TABLE_SIZE)
                    .map(|b| if a == b { 0.0 } else { 1.0 })
                    .collect()
            })
            .collect();
        Self {
            insert,
            delete,
            substitute,
        }
    }
}

impl CostTable {
    /// Build a table from explicit costs. Every table must cover exactly
    /// [`TABLE_SIZE`] code points.
    pub fn new(
        insert: Vec<f64>,
        delete: Vec<f64>,
        substitute: Vec<Vec<f64>>,
    ) -> Result<Self, ConfigurationError> {
        check_size("insert_costs", insert.len())?;
        check_size("delete_costs", delete.len())?;
        check_size("substitute_costs", substitute.len())?;
        for row in &substitute {
            check_size("substitute_costs row", row.len())?;
        }
        Ok(Self {
            insert,
            delete,
            substitute,
        })
    }

    /// Load a table from a JSON object with `insert_costs`, `delete_costs`
    /// and `substitute_costs` keys. Other keys (e.g. `comment`) are ignored.
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        #[derive(serde::Deserialize)]
        struct CostFile {
            insert_costs: Vec<f64>,
            delete_costs: Vec<f64>,
            substitute_costs: Vec<Vec<f64>>,
        }

        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigurationError::MissingFile(path.display().to_string()).into());
        }
        let file: CostFile = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        Ok(Self::new(
            file.insert_costs,
            file.delete_costs,
            file.substitute_costs,
        )?)
    }

    fn single(&self, table: &[f64], c: char) -> f64 {
        if let Some(i) = table_index(c) {
            return table[i];
        }
        match base_letter(c) {
            Some(base) => self.single(table, base) + DIACRITIC_LINK_COST,
            None => 1.0,
        }
    }

    pub fn insert_cost(&self, c: char) -> f64 {
        self.single(&self.insert, c)
    }

    pub fn delete_cost(&self, c: char) -> f64 {
        self.single(&self.delete, c)
    }

    pub fn substitute_cost(&self, a: char, b: char) -> f64 {
        if let (Some(i), Some(j)) = (table_index(a), table_index(b)) {
            return self.substitute[i][j];
        }
        if let Some(base) = base_letter(a) {
            if b == base {
                return DIACRITIC_LINK_COST;
            }
            return self.substitute_cost(base, b) + DIACRITIC_LINK_COST;
        }
        if let Some(base) = base_letter(b) {
            if a == base {
                return DIACRITIC_LINK_COST;
            }
            return self.substitute_cost(a, base) + DIACRITIC_LINK_COST;
        }
        1.0
    }
}

fn check_size(table: &str, found: usize) -> Result<(), ConfigurationError> {
    if found == TABLE_SIZE {
        Ok(())
    } else {
        Err(ConfigurationError::CostTableSize {
            table: table.to_string(),
            expected: TABLE_SIZE,
            found,
        })
    }
}

/// Weighted Levenshtein distance over a [`CostTable`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedLevenshtein {
    costs: CostTable,
}

impl WeightedLevenshtein {
    pub fn new(costs: CostTable) -> Self {
        Self { costs }
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    /// Cost of turning `source` into `target`: deleting characters of
    /// `source`, inserting characters of `target`, substituting between them.
    pub fn distance(&self, source: &str, target: &str) -> f64 {
        if source == target {
            return 0.0;
        }
        let target: Vec<char> = target.chars().collect();

        let mut previous = Vec::with_capacity(target.len() + 1);
        previous.push(0.0);
        for (j, &t) in target.iter().enumerate() {
            previous.push(previous[j] + self.costs.insert_cost(t));
        }
        let mut current = vec![0.0; target.len() + 1];

        for s in source.chars() {
            let deletion = self.costs.delete_cost(s);
            current[0] = previous[0] + deletion;
            for (j, &t) in target.iter().enumerate() {
                let substitution = if s == t {
                    0.0
                } else {
                    self.costs.substitute_cost(s, t)
                };
                current[j + 1] = (current[j] + self.costs.insert_cost(t))
                    .min(previous[j + 1] + deletion)
                    .min(previous[j] + substitution);
            }
            std::mem::swap(&mut previous, &mut current);
        }
        previous[target.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings() {
        let lev = WeightedLevenshtein::default();
        assert_eq!(lev.distance("abc", "abc"), 0.0);
        assert_eq!(lev.distance("aęą", "aęą"), 0.0);
        assert_eq!(lev.distance("ab c", "ab c"), 0.0);
    }

    #[test]
    fn diacritic_links() {
        let lev = WeightedLevenshtein::default();
        assert!(close(lev.distance("eą", "ea"), DIACRITIC_LINK_COST));
        assert!(close(lev.distance("ęą", "ea"), 2.0 * DIACRITIC_LINK_COST));
        assert!(close(lev.distance("lę", "li"), 1.0 + DIACRITIC_LINK_COST));
    }

    #[test]
    fn unlinked_non_ascii() {
        let lev = WeightedLevenshtein::default();
        assert!(close(lev.distance("e", "ε"), 1.0));
        assert!(close(lev.distance("gg", "ggε"), 1.0));
    }

    #[test]
    fn cheap_punctuation() {
        let lev = WeightedLevenshtein::default();
        assert!(close(lev.distance("k1.", "k1"), 0.5));
        assert!(close(lev.distance("k1", "k1,"), 0.5));
        assert!(close(lev.distance("k1.A", "k1"), 1.5));
    }

    #[test]
    fn empty_strings() {
        let lev = WeightedLevenshtein::default();
        assert!(close(lev.distance("", "ab"), 2.0));
        assert!(close(lev.distance("ab", ""), 2.0));
    }

    #[test]
    fn diacritic_insert_cost() {
        let costs = CostTable::default();
        assert!(close(costs.insert_cost('ż'), 1.0 + DIACRITIC_LINK_COST));
        assert!(close(costs.delete_cost('ε'), 1.0));
    }

    #[test]
    fn wrong_table_size() {
        let err = CostTable::new(vec![1.0; 3], vec![1.0; TABLE_SIZE], vec![vec![1.0; TABLE_SIZE]; TABLE_SIZE])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::CostTableSize {
                table: "insert_costs".to_string(),
                expected: TABLE_SIZE,
                found: 3,
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costs.json");
        let mut insert = vec![1.0; TABLE_SIZE];
        insert['x' as usize] = 0.25;
        let json = serde_json::json!({
            "comment": "test table",
            "insert_costs": insert,
            "delete_costs": vec![1.0; TABLE_SIZE],
            "substitute_costs": vec![vec![1.0; TABLE_SIZE]; TABLE_SIZE],
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let costs = CostTable::from_json_file(&path).unwrap();
        assert!(close(costs.insert_cost('x'), 0.25));
        let lev = WeightedLevenshtein::new(costs);
        assert!(close(lev.distance("ab", "abx"), 0.25));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_json_file() {
        let err = CostTable::from_json_file("/nonexistent/costs.json").unwrap_err();
        assert!(matches!(
            err.as_configuration(),
            Some(ConfigurationError::MissingFile(_))
        ));
    }
}
