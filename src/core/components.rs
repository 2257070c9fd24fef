use thiserror::Error;

/// A capital component as supplied by the caller, costs in today's
/// currency. `quantity` defaults to 1, `cycle_years` to `useful_life_years`.
#[derive(Debug, Clone)]
pub struct ComponentInput {
    pub name: String,
    pub quantity: Option<i64>,
    pub useful_life_years: i64,
    pub cycle_years: Option<i64>,
    pub remaining_life_years: i64,
    pub current_replacement_cost: f64,
}

/// Per-component simulation state. `0 <= age <= cycle` holds at every year
/// boundary; a component at `age == cycle` is replaced that year. Value
/// type on purpose: every full-horizon run works on a fresh clone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentState {
    pub cycle: u32,
    pub age: u32,
    pub qty: u32,
    pub cost_today: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidComponentError {
    #[error("component {index}: name must not be empty")]
    EmptyName { index: usize },
    #[error("component {name:?}: replacement cost must be a finite number, got {value}")]
    NonFiniteCost { name: String, value: f64 },
    #[error("component {name:?}: replacement cost must be >= 0, got {value}")]
    NegativeCost { name: String, value: f64 },
}

/// Applies defaults and clamps every component into its valid range. Pure;
/// the returned states share nothing with the inputs.
pub fn normalize(
    components: &[ComponentInput],
) -> Result<Vec<ComponentState>, InvalidComponentError> {
    components
        .iter()
        .enumerate()
        .map(|(index, input)| normalize_one(index, input))
        .collect()
}

fn normalize_one(
    index: usize,
    input: &ComponentInput,
) -> Result<ComponentState, InvalidComponentError> {
    if input.name.trim().is_empty() {
        return Err(InvalidComponentError::EmptyName { index });
    }
    if !input.current_replacement_cost.is_finite() {
        return Err(InvalidComponentError::NonFiniteCost {
            name: input.name.clone(),
            value: input.current_replacement_cost,
        });
    }
    if input.current_replacement_cost < 0.0 {
        return Err(InvalidComponentError::NegativeCost {
            name: input.name.clone(),
            value: input.current_replacement_cost,
        });
    }

    let clamp_years = |v: i64| v.clamp(1, i64::from(u32::MAX)) as u32;
    let useful_life = input.useful_life_years.max(1);
    let cycle = clamp_years(input.cycle_years.unwrap_or(useful_life));
    let remaining = input.remaining_life_years.clamp(0, i64::from(u32::MAX)) as u32;
    let qty = clamp_years(input.quantity.unwrap_or(1));

    // remaining life beyond a full cycle clamps age to 0, not negative
    let age = cycle.saturating_sub(remaining);

    Ok(ComponentState {
        cycle,
        age,
        qty,
        cost_today: input.current_replacement_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str) -> ComponentInput {
        ComponentInput {
            name: name.to_string(),
            quantity: None,
            useful_life_years: 20,
            cycle_years: None,
            remaining_life_years: 8,
            current_replacement_cost: 90_000.0,
        }
    }

    #[test]
    fn normalize_applies_quantity_and_cycle_defaults() {
        let states = normalize(&[component("Paving")]).expect("valid component");
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].qty, 1);
        assert_eq!(states[0].cycle, 20);
        assert_eq!(states[0].age, 12);
        assert_eq!(states[0].cost_today, 90_000.0);
    }

    #[test]
    fn normalize_prefers_explicit_cycle_over_useful_life() {
        let mut input = component("Roof");
        input.cycle_years = Some(25);
        input.remaining_life_years = 5;
        let states = normalize(&[input]).expect("valid component");
        assert_eq!(states[0].cycle, 25);
        assert_eq!(states[0].age, 20);
    }

    #[test]
    fn normalize_floors_out_of_range_fields() {
        let input = ComponentInput {
            name: "Fence".to_string(),
            quantity: Some(0),
            useful_life_years: 0,
            cycle_years: Some(-3),
            remaining_life_years: -2,
            current_replacement_cost: 1_000.0,
        };
        let states = normalize(&[input]).expect("valid component");
        assert_eq!(states[0].qty, 1);
        assert_eq!(states[0].cycle, 1);
        assert_eq!(states[0].age, 1);
    }

    #[test]
    fn normalize_clamps_age_when_remaining_life_exceeds_cycle() {
        let mut input = component("Boiler");
        input.cycle_years = Some(10);
        input.remaining_life_years = 40;
        let states = normalize(&[input]).expect("valid component");
        assert_eq!(states[0].age, 0);
    }

    #[test]
    fn normalize_zero_remaining_life_starts_at_full_age() {
        let mut input = component("Paint");
        input.remaining_life_years = 0;
        let states = normalize(&[input]).expect("valid component");
        assert_eq!(states[0].age, states[0].cycle);
    }

    #[test]
    fn normalize_rejects_empty_name() {
        let mut input = component("  ");
        input.name = "  ".to_string();
        assert_eq!(
            normalize(&[input]),
            Err(InvalidComponentError::EmptyName { index: 0 })
        );
    }

    #[test]
    fn normalize_rejects_non_finite_cost() {
        let mut input = component("Roof");
        input.current_replacement_cost = f64::NAN;
        assert!(matches!(
            normalize(&[input]),
            Err(InvalidComponentError::NonFiniteCost { .. })
        ));
    }

    #[test]
    fn normalize_rejects_negative_cost() {
        let mut input = component("Roof");
        input.current_replacement_cost = -1.0;
        assert!(matches!(
            normalize(&[input]),
            Err(InvalidComponentError::NegativeCost { .. })
        ));
    }

    #[test]
    fn normalize_reports_first_invalid_component() {
        let valid = component("Roof");
        let mut invalid = component("");
        invalid.name = String::new();
        assert_eq!(
            normalize(&[valid, invalid]),
            Err(InvalidComponentError::EmptyName { index: 1 })
        );
    }

    #[test]
    fn normalize_empty_list_yields_empty_states() {
        assert_eq!(normalize(&[]), Ok(Vec::new()));
    }
}
