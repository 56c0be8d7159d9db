//! Variable specifications and the variable registry
//!
//! A [`VariableColumnSpec`] describes how to recognise the raw data column
//! holding one output variable. The [`VariableRegistry`] maps variable ids to
//! their specifications for one ingestion session.

use crate::error::{ObsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column selection rules for one output variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableColumnSpec {
    /// Output variable id (e.g. "scatc550aer")
    pub var_name: String,

    /// Accepted raw component names
    pub components: Vec<String>,

    /// Accepted matrices in order of preference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<String>>,

    /// Accepted statistics in order of preference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Vec<String>>,

    /// Target wavelength in nm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength_nm: Option<f64>,

    /// Wavelength tolerance in nm, falls back to the resolver default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength_tol_nm: Option<f64>,

    /// Fail instead of picking the lowest column index on residual ties
    #[serde(default)]
    pub require_unique: bool,
}

impl VariableColumnSpec {
    pub fn new(var_name: impl Into<String>, components: &[&str]) -> Self {
        Self {
            var_name: var_name.into(),
            components: components.iter().map(|c| c.to_string()).collect(),
            matrix: None,
            statistics: None,
            wavelength_nm: None,
            wavelength_tol_nm: None,
            require_unique: false,
        }
    }

    pub fn with_matrix(mut self, matrix: &[&str]) -> Self {
        self.matrix = Some(matrix.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn with_statistics(mut self, statistics: &[&str]) -> Self {
        self.statistics = Some(statistics.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_wavelength(mut self, wavelength_nm: f64) -> Self {
        self.wavelength_nm = Some(wavelength_nm);
        self
    }

    pub fn with_wavelength_tolerance(mut self, tol_nm: f64) -> Self {
        self.wavelength_tol_nm = Some(tol_nm);
        self
    }

    pub fn with_require_unique(mut self) -> Self {
        self.require_unique = true;
        self
    }

    pub fn accepts_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c == name)
    }

    /// Check the specification for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.var_name.trim().is_empty() {
            return Err(ObsError::configuration("Variable id cannot be empty"));
        }
        if self.components.is_empty() {
            return Err(ObsError::configuration(format!(
                "Variable {} accepts no component names",
                self.var_name
            )));
        }
        if self.wavelength_tol_nm.is_some() && self.wavelength_nm.is_none() {
            return Err(ObsError::configuration(format!(
                "Variable {} defines a wavelength tolerance but no wavelength",
                self.var_name
            )));
        }
        if let Some(tol) = self.wavelength_tol_nm {
            if !(tol >= 0.0) {
                return Err(ObsError::configuration(format!(
                    "Variable {} has invalid wavelength tolerance {}",
                    self.var_name, tol
                )));
            }
        }
        if self.matrix.as_ref().is_some_and(|m| m.is_empty())
            || self.statistics.as_ref().is_some_and(|s| s.is_empty())
        {
            return Err(ObsError::configuration(format!(
                "Variable {} has an empty preference list",
                self.var_name
            )));
        }
        Ok(())
    }
}

/// Registry of variable specifications for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableRegistry {
    specs: BTreeMap<String, VariableColumnSpec>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from validated specifications
    pub fn from_specs(specs: Vec<VariableColumnSpec>) -> Result<Self> {
        let mut registry = Self::new();
        for spec in specs {
            registry.insert(spec)?;
        }
        Ok(registry)
    }

    /// Add or replace a specification
    pub fn insert(&mut self, spec: VariableColumnSpec) -> Result<()> {
        spec.validate()?;
        self.specs.insert(spec.var_name.clone(), spec);
        Ok(())
    }

    pub fn get(&self, var_name: &str) -> Result<&VariableColumnSpec> {
        self.specs.get(var_name).ok_or_else(|| {
            ObsError::variable_definition(format!("No column specification for variable {}", var_name))
        })
    }

    pub fn contains(&self, var_name: &str) -> bool {
        self.specs.contains_key(var_name)
    }

    /// Variable ids this registry can resolve
    pub fn provides_variables(&self) -> Vec<&str> {
        self.specs.keys().map(String::as_str).collect()
    }
}
