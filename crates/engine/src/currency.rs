//! Currencies and the process-lifetime currency registry.

use std::collections::HashMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

/// A named unit of value with a display format and fractional precision.
///
/// `fraction_digits` fixes the scale of every [`Money`] value denominated in
/// this currency: EUR-like currencies use 2 (cents), whole-number currencies
/// use 0. Exactly one currency in a registry is flagged `is_default`; that is
/// the one commands and rewards fall back to when no currency is named.
///
/// Currencies are loaded once at startup and never change for the lifetime
/// of the server session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i32,
    pub name_singular: String,
    pub name_plural: String,
    pub symbol: String,
    pub fraction_digits: u32,
    pub is_default: bool,
}

impl Currency {
    /// Formats an amount with this currency's symbol and scale.
    #[must_use]
    pub fn format(&self, amount: Money) -> String {
        format!("{}{}", self.symbol, amount.format(self.fraction_digits))
    }

    /// Display name for an amount: singular for exactly one major unit,
    /// plural otherwise.
    #[must_use]
    pub fn name_for(&self, amount: Money) -> &str {
        let one = 10_i64.pow(self.fraction_digits);
        if amount.minor() == one {
            &self.name_singular
        } else {
            &self.name_plural
        }
    }
}

/// Immutable lookup table over the currencies known to the server.
///
/// Built once by the engine builder from the `currency` and `default_balance`
/// tables and injected into the engine; no global state. Besides the
/// currencies themselves it carries the configured starting amount each new
/// account is seeded with, per currency (zero when unconfigured).
#[derive(Debug)]
pub struct CurrencyRegistry {
    currencies: Vec<Currency>,
    starting_balances: HashMap<i32, Money>,
    default_index: usize,
}

impl CurrencyRegistry {
    pub(crate) fn new(
        mut currencies: Vec<Currency>,
        starting_balances: HashMap<i32, Money>,
    ) -> ResultEngine<Self> {
        currencies.sort_by_key(|currency| currency.id);

        let mut defaults = currencies.iter().enumerate().filter(|(_, c)| c.is_default);
        let default_index = match defaults.next() {
            Some((index, _)) => index,
            None => {
                return Err(EngineError::KeyNotFound(
                    "default currency not configured".to_string(),
                ));
            }
        };
        if let Some((_, extra)) = defaults.next() {
            return Err(EngineError::ExistingKey(format!(
                "default currency (currency {} is also flagged)",
                extra.id
            )));
        }

        for (currency_id, amount) in &starting_balances {
            if !currencies.iter().any(|c| c.id == *currency_id) {
                return Err(EngineError::KeyNotFound(format!(
                    "currency {currency_id} (referenced by a starting balance)"
                )));
            }
            if amount.is_negative() {
                return Err(EngineError::InvalidAmount(format!(
                    "starting balance for currency {currency_id} must be >= 0"
                )));
            }
        }

        Ok(Self {
            currencies,
            starting_balances,
            default_index,
        })
    }

    /// The currency flagged as default.
    ///
    /// Guaranteed to exist: a registry without one fails to build.
    #[must_use]
    pub fn default_currency(&self) -> &Currency {
        &self.currencies[self.default_index]
    }

    /// Look up a currency by id.
    pub fn currency(&self, id: i32) -> ResultEngine<&Currency> {
        self.currencies
            .iter()
            .find(|currency| currency.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("currency {id}")))
    }

    /// All known currencies, ordered by id.
    #[must_use]
    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    /// Configured starting amount for new accounts in the given currency.
    #[must_use]
    pub fn starting_balance(&self, currency_id: i32) -> Money {
        self.starting_balances
            .get(&currency_id)
            .copied()
            .unwrap_or(Money::ZERO)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "currency")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name_singular: String,
    pub name_plural: String,
    pub symbol: String,
    pub fraction_digits: i32,
    pub is_default: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::balances::Entity")]
    Balances,
}

impl Related<super::balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Currency {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let fraction_digits = u32::try_from(model.fraction_digits).map_err(|_| {
            EngineError::InvalidAmount(format!(
                "currency {} has negative fraction digits",
                model.id
            ))
        })?;
        Ok(Self {
            id: model.id,
            name_singular: model.name_singular,
            name_plural: model.name_plural,
            symbol: model.symbol,
            fraction_digits,
            is_default: model.is_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(id: i32, is_default: bool) -> Currency {
        Currency {
            id,
            name_singular: "Dollar".to_string(),
            name_plural: "Dollars".to_string(),
            symbol: "$".to_string(),
            fraction_digits: 2,
            is_default,
        }
    }

    #[test]
    fn registry_requires_exactly_one_default() {
        let err = CurrencyRegistry::new(vec![dollars(1, false)], HashMap::new()).unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));

        let err = CurrencyRegistry::new(vec![dollars(1, true), dollars(2, true)], HashMap::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::ExistingKey(_)));

        let registry =
            CurrencyRegistry::new(vec![dollars(2, false), dollars(1, true)], HashMap::new())
                .unwrap();
        assert_eq!(registry.default_currency().id, 1);
        assert_eq!(registry.currencies()[0].id, 1);
    }

    #[test]
    fn starting_balance_defaults_to_zero() {
        let registry = CurrencyRegistry::new(
            vec![dollars(1, true)],
            HashMap::from([(1, Money::from_minor(10_000))]),
        )
        .unwrap();
        assert_eq!(registry.starting_balance(1), Money::from_minor(10_000));
        assert_eq!(registry.starting_balance(7), Money::ZERO);
    }

    #[test]
    fn starting_balance_for_unknown_currency_is_rejected() {
        let err = CurrencyRegistry::new(
            vec![dollars(1, true)],
            HashMap::from([(9, Money::from_minor(100))]),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }

    #[test]
    fn formats_with_symbol_and_names() {
        let currency = dollars(1, true);
        assert_eq!(currency.format(Money::from_minor(1050)), "$10.50");
        assert_eq!(currency.name_for(Money::from_minor(100)), "Dollar");
        assert_eq!(currency.name_for(Money::from_minor(250)), "Dollars");
    }
}
