//! Weighted-sum equality problems over finite integer domains, and their textual encodings.
//!
//! A [`Problem`] is built from one domain per variable and a target sum. Domains with the same
//! values are shared between variables, variables never are. The problem can then be rendered in
//! the Sugar CSP format ([`Problem::to_csp`]) or as an XCSP 2.1 instance ([`Problem::to_xcsp`]).
//! Both renderings are deterministic: the same input always produces the same text.
mod sugar;
mod xcsp;

use std::{
    collections::{BTreeSet, HashMap},
    fmt::{self, Display},
};

use thiserror::Error;

pub use sugar::SugarCsp;
pub use xcsp::Xcsp;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("the domain of variable {0} is empty")]
    EmptyDomain(VariableId),

    #[error("a weighted sum needs at least one variable")]
    NoVariables,
}

/// The set of values a variable may take. Order and duplicates in the input are irrelevant; the
/// values are always iterated in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Domain {
    values: BTreeSet<i64>,
}

impl Domain {
    pub fn new(values: impl IntoIterator<Item = i64>) -> Domain {
        Domain {
            values: values.into_iter().collect(),
        }
    }

    /// The values of the domain in ascending order.
    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.values.iter().copied()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.values.contains(&value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<i64> for Domain {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Domain::new(iter)
    }
}

/// Identifies a domain within a problem. Displays as `D1`, `D2`, ... in order of discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(usize);

impl Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0 + 1)
    }
}

/// Identifies a variable within a problem. Displays as `V1`, `V2`, ... in input order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(usize);

impl Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0 + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variable {
    pub id: VariableId,
    pub domain: DomainId,
}

/// The problem `V1 + V2 + ... + Vn = target`, where every `Vi` ranges over its own domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    domains: Box<[Domain]>,
    variables: Box<[Variable]>,
    target: i64,
}

impl Problem {
    /// Create the problem from one domain per variable. Domains which contain the same values
    /// are merged into a single named domain, numbered in the order they are first encountered.
    pub fn weighted_sum<Domains, Values>(
        domains: Domains,
        target: i64,
    ) -> Result<Problem, EncodeError>
    where
        Domains: IntoIterator<Item = Values>,
        Values: IntoIterator<Item = i64>,
    {
        let mut unique_domains: Vec<Domain> = vec![];
        let mut domain_ids: HashMap<Domain, DomainId> = HashMap::new();
        let mut variables = vec![];

        for (idx, values) in domains.into_iter().enumerate() {
            let id = VariableId(idx);
            let domain = Domain::new(values);

            if domain.is_empty() {
                return Err(EncodeError::EmptyDomain(id));
            }

            let domain = match domain_ids.get(&domain) {
                Some(&domain_id) => domain_id,
                None => {
                    let domain_id = DomainId(unique_domains.len());
                    unique_domains.push(domain.clone());
                    domain_ids.insert(domain, domain_id);
                    domain_id
                }
            };

            variables.push(Variable { id, domain });
        }

        if variables.is_empty() {
            return Err(EncodeError::NoVariables);
        }

        Ok(Problem {
            domains: unique_domains.into(),
            variables: variables.into(),
            target,
        })
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// The distinct domains, in the order they were first used by a variable.
    pub fn domains(&self) -> impl Iterator<Item = (DomainId, &Domain)> + '_ {
        self.domains
            .iter()
            .enumerate()
            .map(|(idx, domain)| (DomainId(idx), domain))
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn domain(&self, id: DomainId) -> &Domain {
        &self.domains[id.0]
    }

    pub fn domain_of(&self, variable: VariableId) -> &Domain {
        self.domain(self.variables[variable.0].domain)
    }

    /// Check that `assignment` gives every variable, in order, a value from its domain and that
    /// the values add up to the target.
    pub fn is_solution(&self, assignment: &[i64]) -> bool {
        assignment.len() == self.variables.len()
            && self
                .variables
                .iter()
                .zip(assignment)
                .all(|(variable, &value)| self.domain_of(variable.id).contains(value))
            && assignment.iter().sum::<i64>() == self.target
    }

    /// Render the problem in the Sugar CSP format.
    pub fn to_csp(&self) -> String {
        SugarCsp(self).to_string()
    }

    /// Render the problem as an XCSP 2.1 instance.
    pub fn to_xcsp(&self) -> String {
        Xcsp(self).to_string()
    }
}

/// Encode a weighted-sum equality problem in the Sugar CSP format. This is a shorthand for
/// [`Problem::weighted_sum`] followed by [`Problem::to_csp`].
pub fn weighted_sum_to_csp<Domains, Values>(
    domains: Domains,
    target: i64,
) -> Result<String, EncodeError>
where
    Domains: IntoIterator<Item = Values>,
    Values: IntoIterator<Item = i64>,
{
    Problem::weighted_sum(domains, target).map(|problem| problem.to_csp())
}
