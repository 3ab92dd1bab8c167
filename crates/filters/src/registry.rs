//! Kind-to-policy lookup table

use crate::policies::{
    CountySalesPolicy, GenericPolicy, IndexByYearPolicy, NumericIndexPolicy, RegionalSalesPolicy,
};
use crate::{DatasetKind, Error, FilterPolicy, NumericRange, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Bound overrides for the built-in policies, as read from a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub regional_sales: RegionalSalesPolicy,
    pub county_sales: CountySalesPolicy,
    pub index_by_year: IndexByYearPolicy,
    pub numeric_index: NumericIndexPolicy,
}

impl PolicySettings {
    /// Every configured range, labelled `policy.field`
    pub fn ranges(&self) -> Vec<(&'static str, NumericRange)> {
        let r = &self.regional_sales;
        let c = &self.county_sales;
        vec![
            ("regional_sales.price", r.price),
            ("regional_sales.bedrooms", r.bedrooms),
            ("regional_sales.bathrooms", r.bathrooms),
            ("regional_sales.living_area", r.living_area),
            ("regional_sales.lot_area", r.lot_area),
            ("county_sales.price", c.price),
            ("county_sales.bedrooms", c.bedrooms),
            ("county_sales.bathrooms", c.bathrooms),
            ("county_sales.sqft_living", c.sqft_living),
            ("county_sales.sqft_lot", c.sqft_lot),
            ("county_sales.latitude", c.latitude),
            ("county_sales.longitude", c.longitude),
            ("county_sales.grade", c.grade),
            ("index_by_year.price", self.index_by_year.price),
            ("numeric_index.value", self.numeric_index.value),
        ]
    }

    /// Reject ranges that can never hold a value.
    pub fn validate(&self) -> Result<()> {
        for (name, range) in self.ranges() {
            if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
                return Err(Error::InvalidConfig(format!("{} has an empty range {}", name, range)));
            }
        }
        Ok(())
    }
}

/// Registry mapping each [`DatasetKind`] to its policy
#[derive(Debug)]
pub struct PolicyRegistry {
    policies: BTreeMap<DatasetKind, Box<dyn FilterPolicy>>,
    fallback: GenericPolicy,
}

impl PolicyRegistry {
    /// An empty registry; every kind resolves to the generic policy.
    pub fn empty() -> Self {
        Self {
            policies: BTreeMap::new(),
            fallback: GenericPolicy,
        }
    }

    /// Registry with the built-in policies and their default bounds
    pub fn standard() -> Self {
        Self::from_settings(&PolicySettings::default())
    }

    pub fn from_settings(settings: &PolicySettings) -> Self {
        Self::empty()
            .register(settings.regional_sales.clone())
            .register(settings.county_sales.clone())
            .register(settings.index_by_year.clone())
            .register(settings.numeric_index.clone())
            .register(GenericPolicy)
    }

    /// Add or replace the policy for its kind.
    pub fn register<P: FilterPolicy + 'static>(mut self, policy: P) -> Self {
        let kind = policy.kind();
        if self.policies.insert(kind, Box::new(policy)).is_some() {
            debug!("Replaced policy for {}", kind);
        }
        self
    }

    /// The policy for `kind`, or the generic policy if none is registered.
    pub fn policy_for(&self, kind: DatasetKind) -> &dyn FilterPolicy {
        match self.policies.get(&kind) {
            Some(policy) => policy.as_ref(),
            None => &self.fallback,
        }
    }

    pub fn contains(&self, kind: DatasetKind) -> bool {
        self.policies.contains_key(&kind)
    }

    /// Registered kinds in order
    pub fn kinds(&self) -> impl Iterator<Item = DatasetKind> + '_ {
        self.policies.keys().copied()
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
