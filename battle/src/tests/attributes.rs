use super::*;
use crate::attribute::Attribute;
use proptest::prelude::*;

#[test]
fn test_attribute_floor() {
    let mut attr = Attribute::new(3);
    attr.minus(10);
    assert_eq!(attr.value(), 1);
    assert_eq!(attr.base, 3);

    attr.plus(12);
    assert_eq!(attr.value(), 5);
}

#[test]
fn test_attribute_zero_base_reports_one() {
    assert_eq!(Attribute::new(0).value(), 1);
    assert_eq!(Attribute::new(-4).value(), 1);
}

proptest! {
    #[test]
    fn prop_attribute_value_is_clamped_sum(
        base in -100i32..100,
        ops in proptest::collection::vec((any::<bool>(), 0i32..50), 0..20),
    ) {
        let mut attr = Attribute::new(base);
        for (up, amount) in ops {
            if up { attr.plus(amount) } else { attr.minus(amount) }
            prop_assert_eq!(attr.value(), (attr.base + attr.bonus).max(1));
        }
        prop_assert_eq!(attr.base, base);
    }
}

// ==========================================
// TYPE MULTIPLIERS
// ==========================================

#[test]
fn test_multiplier_examples() {
    assert_eq!(Multiplier::Amplified.apply(10), 15);
    assert_eq!(Multiplier::Reduced.apply(10), 7);
    assert_eq!(Multiplier::Normal.apply(10), 10);
}

#[test]
fn test_type_picks_multiplier() {
    let dummy = UnitTypeId::new("dummy");
    assert_eq!(resistant_type().multiplier(Some(&dummy)), Multiplier::Reduced);
    assert_eq!(weak_type().multiplier(Some(&dummy)), Multiplier::Amplified);
    assert_eq!(normal_type().multiplier(Some(&dummy)), Multiplier::Normal);
    assert_eq!(weak_type().multiplier(None), Multiplier::Normal);
}

proptest! {
    #[test]
    fn prop_multipliers_truncate(amount in 0i32..10_000) {
        prop_assert_eq!(Multiplier::Amplified.apply(amount), amount * 3 / 2);
        prop_assert_eq!(Multiplier::Reduced.apply(amount), amount - amount / 3);
        prop_assert_eq!(Multiplier::Normal.apply(amount), amount);
    }
}

// ==========================================
// UNITS
// ==========================================

#[test]
fn test_unit_damage_uses_defending_type() {
    let dummy = UnitTypeId::new("dummy");
    let mut unit = Unit::from_instance(
        UnitId(1),
        &UnitInstance::new(tester_template("weak", weak_type())),
    );

    assert_eq!(unit.damage(10, Some(&dummy)), 15);
    assert_eq!(unit.health(), 5);

    assert_eq!(unit.damage(10, Some(&dummy)), 15);
    assert_eq!(unit.health(), 0);
    assert!(!unit.is_alive());
}

#[test]
fn test_unit_heal_is_capped() {
    let mut unit = create_dummy_unit(1, "A", 20, 5, 5);
    unit.damage(8, None);
    unit.heal(3);
    assert_eq!(unit.health(), 15);
    unit.heal(100);
    assert_eq!(unit.health(), 20);
}

#[test]
fn test_health_bonus_rescales_current_health() {
    let mut unit = create_dummy_unit(1, "A", 20, 5, 5);
    unit.damage(5, None);

    unit.plus_health(4);
    assert_eq!(unit.max_health.value(), 24);
    assert_eq!(unit.health(), 19);

    unit.minus_health(10);
    assert_eq!(unit.max_health.value(), 14);
    assert_eq!(unit.health(), 14);
}

#[test]
fn test_extreme_amounts_keep_health_in_range() {
    let mut unit = create_dummy_unit(1, "A", 20, 5, 5);
    unit.damage(5, None);

    unit.heal(i32::MAX);
    assert_eq!(unit.health(), 20);

    unit.plus_health(i32::MAX);
    assert_eq!(unit.max_health.value(), i32::MAX);
    assert_eq!(unit.health(), i32::MAX);

    // Negative damage never heals
    assert_eq!(unit.damage(-50, None), 0);
    assert_eq!(unit.health(), i32::MAX);
}

#[test]
fn test_amplified_damage_saturates() {
    let dummy = UnitTypeId::new("dummy");
    let mut unit = Unit::from_instance(
        UnitId(1),
        &UnitInstance::new(tester_template("weak", weak_type())),
    );

    assert_eq!(Multiplier::Amplified.apply(i32::MAX), i32::MAX);
    assert_eq!(unit.damage(i32::MAX, Some(&dummy)), i32::MAX);
    assert_eq!(unit.health(), 0);
    assert!(!unit.is_alive());
}

#[test]
fn test_instance_stats_grow_with_level() {
    let instance = UnitInstance::new(dummy_template()).with_level(7);
    assert_eq!(instance.health(), 20 + 8 / 3);
    assert_eq!(instance.power(), 10 + 7 / 3);
    assert_eq!(instance.speed(), 10 + 6 / 3);

    let level_one = UnitInstance::new(dummy_template());
    assert_eq!(level_one.health(), 20);
    assert_eq!(level_one.power(), 10);
    assert_eq!(level_one.speed(), 10);
}

#[test]
fn test_explicit_zero_health_is_honoured() {
    let mut instance = UnitInstance::new(dummy_template());
    instance.health = Some(0);
    let unit = Unit::from_instance(UnitId(1), &instance);

    // The clamp keeps the unit fightable at 1
    assert_eq!(unit.max_health.value(), 1);
    assert_eq!(unit.health(), 1);
}

#[test]
fn test_instance_ability_override() {
    let template = logger_template();
    assert_eq!(UnitInstance::new(template.clone()).ability(), Some(&log_ability()));

    let other = Ability::new("none", "Do Nothing");
    let instance = UnitInstance::new(template).with_ability(other.clone());
    assert_eq!(instance.ability(), Some(&other));
}
