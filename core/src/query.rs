use std::fmt;

use crate::error::RequestError;

/// Row limit as supplied by the caller: a number or a digit string.
///
/// A zero count or an empty string means "no limit". A digit string is kept
/// verbatim, so `"0"` still emits `LIMIT 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    Text(String),
}

impl Limit {
    pub fn is_set(&self) -> bool {
        match self {
            Limit::Count(n) => *n != 0,
            Limit::Text(s) => !s.is_empty(),
        }
    }

    fn validate(&self) -> Result<(), RequestError> {
        match self {
            Limit::Text(s) if !s.chars().all(|c| c.is_ascii_digit()) => {
                Err(RequestError::InvalidLimit {
                    received: s.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Count(n) => write!(f, "{n}"),
            Limit::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Limit {
    fn from(value: u64) -> Self {
        Limit::Count(value)
    }
}

impl From<&str> for Limit {
    fn from(value: &str) -> Self {
        Limit::Text(value.to_string())
    }
}

/// One search call: which fields of which resource, filtered and ordered by
/// caller-supplied fragments.
///
/// `conditions` and `orderings` are a trust boundary. They are pasted into the
/// query verbatim, without escaping or syntax checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub customer_id: String,
    pub fields: Vec<String>,
    pub resource: String,
    pub conditions: Vec<String>,
    pub orderings: Vec<String>,
    pub limit: Option<Limit>,
}

impl SearchRequest {
    pub fn new(
        customer_id: impl Into<String>,
        fields: Vec<String>,
        resource: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let customer_id = customer_id.into();
        let resource = resource.into();
        if customer_id.trim().is_empty() {
            return Err(RequestError::EmptyCustomerId);
        }
        if fields.is_empty() {
            return Err(RequestError::EmptyFields);
        }
        if let Some(index) = fields.iter().position(|f| f.trim().is_empty()) {
            return Err(RequestError::EmptyField { index });
        }
        if resource.trim().is_empty() {
            return Err(RequestError::EmptyResource);
        }
        Ok(Self {
            customer_id,
            fields,
            resource,
            conditions: Vec::new(),
            orderings: Vec::new(),
            limit: None,
        })
    }

    pub fn with_conditions(mut self, conditions: Vec<String>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_orderings(mut self, orderings: Vec<String>) -> Self {
        self.orderings = orderings;
        self
    }

    pub fn with_limit(mut self, limit: Option<Limit>) -> Result<Self, RequestError> {
        if let Some(limit) = &limit {
            limit.validate()?;
        }
        self.limit = limit;
        Ok(self)
    }

    /// Assembles the query string. Clause order is fixed; optional clauses
    /// appear only when their input is non-empty (or, for LIMIT, set).
    pub fn build_query(&self) -> String {
        let mut query = format!("SELECT {} FROM {}", self.fields.join(","), self.resource);

        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }

        if !self.orderings.is_empty() {
            query.push_str(" ORDER BY ");
            query.push_str(&self.orderings.join(","));
        }

        if let Some(limit) = self.limit.as_ref().filter(|limit| limit.is_set()) {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        query
    }
}
