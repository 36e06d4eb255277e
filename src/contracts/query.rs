//! Filter, sort and pagination for contract listings

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::ListContractsParams;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Columns of the `contracts` table that a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractColumn {
    Id,
    Name,
    Address,
    DeploymentDate,
}

impl ContractColumn {
    pub const ALL: [ContractColumn; 4] = [
        ContractColumn::Id,
        ContractColumn::Name,
        ContractColumn::Address,
        ContractColumn::DeploymentDate,
    ];

    /// Column name as it appears in SQL
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractColumn::Id => "id",
            ContractColumn::Name => "name",
            ContractColumn::Address => "address",
            ContractColumn::DeploymentDate => "deployment_date",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortSpecError {
    #[error("Invalid sort specification '{0}'. Expected field[:asc|desc]")]
    Malformed(String),

    #[error("Invalid sort field '{field}'. Valid fields: {valid}")]
    UnknownField { field: String, valid: String },

    #[error("Invalid sort order '{0}'. Valid orders: asc, desc")]
    UnknownOrder(String),
}

/// Parsed `field[:order]` sort parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: ContractColumn,
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: ContractColumn::DeploymentDate,
            order: SortOrder::Asc,
        }
    }
}

impl FromStr for SortSpec {
    type Err = SortSpecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(':');
        let field = parts.next().unwrap_or_default().trim();
        let order = parts.next().map(str::trim);
        if parts.next().is_some() || field.is_empty() {
            return Err(SortSpecError::Malformed(raw.to_string()));
        }

        let column =
            ContractColumn::from_name(field).ok_or_else(|| SortSpecError::UnknownField {
                field: field.to_string(),
                valid: ContractColumn::valid_names(),
            })?;

        let order = match order.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => return Err(SortSpecError::UnknownOrder(other.to_string())),
        };

        Ok(SortSpec { column, order })
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        write!(f, "{}:{}", self.column.as_str(), order)
    }
}

/// Validated listing request handed to a [`crate::store::ContractStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFilter {
    pub name: Option<String>,
    pub address: Option<String>,
    pub sort: SortSpec,
    pub limit: i64,
    pub skip: i64,
}

impl Default for ContractFilter {
    fn default() -> Self {
        Self {
            name: None,
            address: None,
            sort: SortSpec::default(),
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

impl TryFrom<ListContractsParams> for ContractFilter {
    type Error = SortSpecError;

    /// Range checks on `limit`/`skip` belong to the params' `Validate` impl;
    /// values are clamped here only so a filter is always well formed.
    fn try_from(params: ListContractsParams) -> Result<Self, Self::Error> {
        let sort = match params.sort_by.as_deref() {
            Some(raw) => raw.parse()?,
            None => SortSpec::default(),
        };

        Ok(Self {
            name: params.name.filter(|s| !s.is_empty()),
            address: params.address.filter(|s| !s.is_empty()),
            sort,
            limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            skip: params.skip.unwrap_or(0).max(0),
        })
    }
}

/// One page of a listing plus the unpaginated match count
#[derive(Debug, Clone)]
pub struct ContractPage<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// `%needle%` for ILIKE with the LIKE metacharacters escaped
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
