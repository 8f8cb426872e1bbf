use std::collections::{HashMap, VecDeque};
use std::path::Path;

use crate::error::{HeredityError, Result};

/// Loader output: one row of population input with parents still named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    /// Unique name of the individual.
    pub name: String,
    /// Mother's name, or `None` for a founder.
    pub mother: Option<String>,
    /// Father's name, or `None` for a founder.
    pub father: Option<String>,
    /// `Some(true)` / `Some(false)` when the trait was observed, `None` if unknown.
    pub observed_trait: Option<bool>,
}

impl PersonRecord {
    /// A record with no parents.
    pub fn founder(name: &str, observed_trait: Option<bool>) -> Self {
        Self {
            name: name.to_string(),
            mother: None,
            father: None,
            observed_trait,
        }
    }

    /// A record with both parents named.
    pub fn child(name: &str, mother: &str, father: &str, observed_trait: Option<bool>) -> Self {
        Self {
            name: name.to_string(),
            mother: Some(mother.to_string()),
            father: Some(father.to_string()),
            observed_trait,
        }
    }
}

/// Indices of both parents of a non-founder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parents {
    /// Population index of the mother.
    pub mother: usize,
    /// Population index of the father.
    pub father: usize,
}

/// A single member of the population.
#[derive(Debug, Clone)]
pub struct Individual {
    /// Unique name within the population.
    name: String,
    /// `None` for founders. A lone parent cannot be represented.
    parents: Option<Parents>,
    /// Observed trait, or `None` when unknown.
    observed_trait: Option<bool>,
}

impl Individual {
    /// Name of the individual.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indices of both parents, or `None` for a founder.
    pub fn parents(&self) -> Option<Parents> {
        self.parents
    }

    /// Whether the individual has no recorded parents.
    pub fn is_founder(&self) -> bool {
        self.parents.is_none()
    }

    /// `Some(true)` / `Some(false)` when observed, `None` if unknown.
    pub fn observed_trait(&self) -> Option<bool> {
        self.observed_trait
    }
}

/// Individuals linked by mother/father relationships, with partial trait
/// observations.
///
/// Individuals are mapped to contiguous 0-based indices in insertion order.
/// Every individual has either both parents or neither, and every parent
/// reference resolves to another individual of the same population.
#[derive(Debug, Clone, Default)]
pub struct Population {
    individuals: Vec<Individual>,
    name_to_index: HashMap<String, usize>,
}

impl Population {
    /// Create an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population has no individuals.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Look up the 0-based index of an individual by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Look up an individual by its 0-based index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn individual(&self, index: usize) -> &Individual {
        &self.individuals[index]
    }

    /// Individuals in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// Indices of all individuals without parents.
    pub fn founders(&self) -> impl Iterator<Item = usize> + '_ {
        self.individuals
            .iter()
            .enumerate()
            .filter(|(_, ind)| ind.is_founder())
            .map(|(i, _)| i)
    }

    /// Observed traits keyed by name. Unobserved individuals are absent.
    pub fn evidence(&self) -> HashMap<&str, bool> {
        self.individuals
            .iter()
            .filter_map(|ind| ind.observed_trait.map(|t| (ind.name.as_str(), t)))
            .collect()
    }

    /// Add an individual whose parents (if any) are already present.
    ///
    /// # Errors
    /// Returns an error if the name already exists, if only one parent is
    /// given, or if a parent has not been added yet.
    pub fn add_individual(
        &mut self,
        name: &str,
        mother: Option<&str>,
        father: Option<&str>,
        observed_trait: Option<bool>,
    ) -> Result<()> {
        if self.name_to_index.contains_key(name) {
            return Err(duplicate(name));
        }
        let parents = self.resolve_parents(name, mother, father)?;
        self.push(name, parents, observed_trait);
        Ok(())
    }

    /// Build a population from loader records given in any order.
    ///
    /// # Errors
    /// Returns the first structural problem found: duplicate names, a lone
    /// parent, a dangling parent reference, self-parentage or a cycle.
    pub fn from_records(records: &[PersonRecord]) -> Result<Self> {
        let mut population = Self::new();

        // First pass: register every name so parents may follow their children.
        for rec in records {
            if population.name_to_index.contains_key(&rec.name) {
                return Err(duplicate(&rec.name));
            }
            population.push(&rec.name, None, rec.observed_trait);
        }

        for (i, rec) in records.iter().enumerate() {
            let parents = population.resolve_parents(
                &rec.name,
                rec.mother.as_deref(),
                rec.father.as_deref(),
            )?;
            population.individuals[i].parents = parents;
        }

        population.validate()?;
        Ok(population)
    }

    /// Read a population from a CSV file.
    ///
    /// Expected columns (header required): `name`, `mother`, `father`, `trait`.
    /// Absent parents are blank or `NA`. The trait is `1`/`true`, `0`/`false`,
    /// or blank/`NA` when unknown.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, a column is missing, a
    /// trait value is not recognised, or the pedigree is inconsistent.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| HeredityError::Data(format!("CSV missing '{}' column", name)))
        };
        let name_col = column("name")?;
        let mother_col = column("mother")?;
        let father_col = column("father")?;
        let trait_col = column("trait")?;

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            let field = |col: usize| row.get(col).unwrap_or("");

            let name = field(name_col);
            if name.is_empty() {
                return Err(HeredityError::Data("Row with empty name".to_string()));
            }
            records.push(PersonRecord {
                name: name.to_string(),
                mother: parse_parent(field(mother_col)),
                father: parse_parent(field(father_col)),
                observed_trait: parse_trait(field(trait_col))
                    .map_err(|msg| HeredityError::Data(format!("'{}': {}", name, msg)))?,
            });
        }

        log::debug!("Loaded {} records from {}", records.len(), path.as_ref().display());
        Self::from_records(&records)
    }

    /// Validate the parent graph.
    ///
    /// Checks:
    /// - No individual is its own parent.
    /// - No individual is its own ancestor (cycle detection).
    ///
    /// # Errors
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let n = self.individuals.len();

        for (i, ind) in self.individuals.iter().enumerate() {
            if let Some(p) = ind.parents {
                if p.mother == i || p.father == i {
                    return Err(HeredityError::Pedigree(format!(
                        "'{}' is listed as their own parent",
                        ind.name
                    )));
                }
            }
        }

        // Kahn's algorithm over parent -> child edges. Anything left
        // unvisited sits on a cycle.
        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0u32; n];
        for (i, ind) in self.individuals.iter().enumerate() {
            if let Some(p) = ind.parents {
                children_of[p.mother].push(i);
                children_of[p.father].push(i);
                in_degree[i] += 2;
            }
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut visited = 0usize;
        while let Some(node) = queue.pop_front() {
            visited += 1;
            for &child in &children_of[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if visited != n {
            return Err(HeredityError::Pedigree(
                "Pedigree contains a cycle".to_string(),
            ));
        }

        Ok(())
    }

    fn push(&mut self, name: &str, parents: Option<Parents>, observed_trait: Option<bool>) {
        self.name_to_index.insert(name.to_string(), self.individuals.len());
        self.individuals.push(Individual {
            name: name.to_string(),
            parents,
            observed_trait,
        });
    }

    fn resolve_parents(
        &self,
        name: &str,
        mother: Option<&str>,
        father: Option<&str>,
    ) -> Result<Option<Parents>> {
        let lookup = |role: &'static str, parent: &str| {
            self.index_of(parent)
                .ok_or_else(|| HeredityError::UnknownIndividualReference {
                    individual: name.to_string(),
                    role,
                    parent: parent.to_string(),
                })
        };
        match (mother, father) {
            (None, None) => Ok(None),
            (Some(m), Some(f)) => Ok(Some(Parents {
                mother: lookup("mother", m)?,
                father: lookup("father", f)?,
            })),
            (Some(_), None) => Err(malformed(name, "mother", "father")),
            (None, Some(_)) => Err(malformed(name, "father", "mother")),
        }
    }
}

fn duplicate(name: &str) -> HeredityError {
    HeredityError::Pedigree(format!("Duplicate individual: '{}'", name))
}

fn malformed(name: &str, present: &'static str, missing: &'static str) -> HeredityError {
    HeredityError::MalformedPedigree {
        individual: name.to_string(),
        present,
        missing,
    }
}

/// Blank and `NA` mean no parent.
fn parse_parent(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_trait(s: &str) -> std::result::Result<Option<bool>, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(Some(true)),
        "0" | "false" => Ok(Some(false)),
        other => Err(format!("unrecognised trait value '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Helper: write CSV content to a temporary file and return the path.
    fn write_temp_csv(content: &str) -> String {
        let dir = std::env::temp_dir();
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let file_name = format!("test_population_{}_{}.csv", std::process::id(), id);
        let path = dir.join(file_name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn potter_records() -> Vec<PersonRecord> {
        vec![
            PersonRecord::child("Harry", "Lily", "James", None),
            PersonRecord::founder("James", Some(true)),
            PersonRecord::founder("Lily", Some(false)),
        ]
    }

    #[test]
    fn test_from_records_child_before_parents() {
        let pop = Population::from_records(&potter_records()).unwrap();
        assert_eq!(pop.len(), 3);
        assert_eq!(pop.index_of("Harry"), Some(0));
        assert_eq!(pop.index_of("James"), Some(1));
        assert_eq!(pop.index_of("Lily"), Some(2));

        let harry = pop.individual(0);
        assert_eq!(
            harry.parents(),
            Some(Parents {
                mother: 2,
                father: 1
            })
        );
        assert!(!harry.is_founder());
        assert!(pop.individual(1).is_founder());
        assert_eq!(pop.founders().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_accessors_in_index_order() {
        let empty = Population::new();
        assert!(empty.is_empty());
        assert_eq!(empty.iter().count(), 0);

        let pop = Population::from_records(&potter_records()).unwrap();
        assert!(!pop.is_empty());
        let names: Vec<&str> = pop.iter().map(|ind| ind.name()).collect();
        assert_eq!(names, vec!["Harry", "James", "Lily"]);
        let traits: Vec<Option<bool>> = pop.iter().map(|ind| ind.observed_trait()).collect();
        assert_eq!(traits, vec![None, Some(true), Some(false)]);
        assert_eq!(pop.individual(2).parents(), None);
    }

    #[test]
    fn test_evidence_omits_unobserved() {
        let pop = Population::from_records(&potter_records()).unwrap();
        let evidence = pop.evidence();
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence.get("James"), Some(&true));
        assert_eq!(evidence.get("Lily"), Some(&false));
        assert!(!evidence.contains_key("Harry"));
    }

    #[test]
    fn test_lone_parent_is_malformed() {
        let records = vec![
            PersonRecord::founder("A", None),
            PersonRecord {
                name: "B".to_string(),
                mother: Some("A".to_string()),
                father: None,
                observed_trait: None,
            },
        ];
        let err = Population::from_records(&records).unwrap_err();
        match err {
            HeredityError::MalformedPedigree {
                individual,
                present,
                missing,
            } => {
                assert_eq!(individual, "B");
                assert_eq!(present, "mother");
                assert_eq!(missing, "father");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unknown_parent_reference() {
        let records = vec![
            PersonRecord::founder("A", None),
            PersonRecord::child("C", "A", "Ghost", None),
        ];
        let err = Population::from_records(&records).unwrap_err();
        assert!(matches!(
            err,
            HeredityError::UnknownIndividualReference { role: "father", .. }
        ));
        assert!(err.to_string().contains("Ghost"), "Error was: {}", err);
    }

    #[test]
    fn test_duplicate_name() {
        let records = vec![
            PersonRecord::founder("A", None),
            PersonRecord::founder("A", Some(true)),
        ];
        let msg = Population::from_records(&records).unwrap_err().to_string();
        assert!(msg.contains("Duplicate"), "Error was: {}", msg);
    }

    #[test]
    fn test_self_parent_detected() {
        let records = vec![
            PersonRecord::founder("A", None),
            PersonRecord::child("B", "A", "B", None),
        ];
        let msg = Population::from_records(&records).unwrap_err().to_string();
        assert!(msg.contains("own parent"), "Error was: {}", msg);
    }

    #[test]
    fn test_cycle_detected() {
        let records = vec![
            PersonRecord::founder("F", None),
            PersonRecord::child("A", "F", "B", None),
            PersonRecord::child("B", "F", "A", None),
        ];
        let msg = Population::from_records(&records).unwrap_err().to_string();
        assert!(msg.contains("cycle"), "Error was: {}", msg);
    }

    #[test]
    fn test_three_generations_validate() {
        let records = vec![
            PersonRecord::founder("G1", None),
            PersonRecord::founder("G2", None),
            PersonRecord::founder("P2", None),
            PersonRecord::child("P1", "G1", "G2", None),
            PersonRecord::child("C", "P1", "P2", Some(true)),
        ];
        let pop = Population::from_records(&records).unwrap();
        assert!(pop.validate().is_ok());
        assert_eq!(pop.founders().count(), 3);
    }

    #[test]
    fn test_add_individual_incremental() {
        let mut pop = Population::new();
        pop.add_individual("M", None, None, None).unwrap();
        pop.add_individual("F", None, None, Some(false)).unwrap();
        pop.add_individual("K", Some("M"), Some("F"), Some(true)).unwrap();

        assert_eq!(pop.len(), 3);
        let k = pop.individual(pop.index_of("K").unwrap());
        assert_eq!(k.parents(), Some(Parents { mother: 0, father: 1 }));
        assert_eq!(k.observed_trait(), Some(true));
    }

    #[test]
    fn test_add_individual_requires_existing_parents() {
        let mut pop = Population::new();
        pop.add_individual("M", None, None, None).unwrap();
        assert!(pop.add_individual("K", Some("M"), Some("F"), None).is_err());
        assert!(pop.add_individual("M", None, None, None).is_err());
        assert_eq!(pop.len(), 1);
    }

    #[test]
    fn test_from_csv_basic() {
        let csv = "name,mother,father,trait\nHarry,Lily,James,\nJames,,,1\nLily,,,0\n";
        let path = write_temp_csv(csv);
        let pop = Population::from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(pop.len(), 3);
        assert_eq!(pop.individual(0).observed_trait(), None);
        assert_eq!(pop.individual(1).observed_trait(), Some(true));
        assert_eq!(pop.individual(2).observed_trait(), Some(false));
        assert_eq!(
            pop.individual(0).parents(),
            Some(Parents {
                mother: 2,
                father: 1
            })
        );
    }

    #[test]
    fn test_from_csv_header_case_and_na() {
        let csv = "Name,Mother,Father,Trait\nX,NA,NA,NA\nY,NA,NA,true\n";
        let path = write_temp_csv(csv);
        let pop = Population::from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(pop.len(), 2);
        assert!(pop.individual(0).is_founder());
        assert_eq!(pop.individual(0).observed_trait(), None);
        assert_eq!(pop.individual(1).observed_trait(), Some(true));
    }

    #[test]
    fn test_from_csv_missing_column() {
        let csv = "name,mother,father\nX,,\n";
        let path = write_temp_csv(csv);
        let result = Population::from_csv(&path);
        std::fs::remove_file(&path).ok();

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("'trait'"), "Error was: {}", msg);
    }

    #[test]
    fn test_from_csv_bad_trait_value() {
        let csv = "name,mother,father,trait\nX,,,maybe\n";
        let path = write_temp_csv(csv);
        let result = Population::from_csv(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(HeredityError::Data(_))));
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(parse_parent(""), None);
        assert_eq!(parse_parent("  "), None);
        assert_eq!(parse_parent("NA"), None);
        assert_eq!(parse_parent("Lily"), Some("Lily".to_string()));

        assert_eq!(parse_trait("1"), Ok(Some(true)));
        assert_eq!(parse_trait("TRUE"), Ok(Some(true)));
        assert_eq!(parse_trait("0"), Ok(Some(false)));
        assert_eq!(parse_trait(""), Ok(None));
        assert!(parse_trait("2").is_err());
    }
}
