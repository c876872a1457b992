//! End-to-end hit resolution: selection statistics, coverage gates,
//! layered damage, severing and organ loss

use std::collections::HashMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use creature_anatomy::anatomy::{
    BodyPlanBuilder, Creature, InternalSpec, LimbKind, LimbSpec, PartSpec, PartStatus,
    StructureStatus, WornArmor,
};
use creature_anatomy::armor::pipeline::{absorb, dissipate};
use creature_anatomy::armor::{ArmorLayer, ChannelFormulas, ChannelSet, DamageTriple, DamageType};
use creature_anatomy::combat::severing::sever;
use creature_anatomy::combat::{
    weighted_pick, AttackDescriptor, HitResolver, IneffectiveReason, LayerSite, StrikeOutcome,
};
use creature_anatomy::core::types::{Alignment, Orientation, PenetrationDegree};
use creature_anatomy::core::{DetachPolicy, ResolutionError, TopologyError};
use creature_anatomy::formula::{evaluate, Bindings, Formula};

fn formulas(dissipate: Option<&str>, absorb: Option<&str>) -> ChannelFormulas {
    ChannelFormulas {
        dissipate: dissipate.map(|f| Formula::compile(f).unwrap()),
        absorb: absorb.map(|f| Formula::compile(f).unwrap()),
    }
}

fn damage_only(dissipate: Option<&str>, absorb: Option<&str>) -> ChannelSet {
    ChannelSet {
        damage: formulas(dissipate, absorb),
        ..ChannelSet::default()
    }
}

fn part(alias: &str, weight: u32) -> PartSpec {
    PartSpec::new(alias, alias, Alignment::Front, Orientation::Centre, weight)
}

fn hit(amount: f32) -> AttackDescriptor {
    AttackDescriptor::new(DamageType::Crushing, DamageTriple::new(amount, 0.0, 0.0))
}

/// Pearson statistic for observed counts against expected proportions
fn chi_squared(observed: &[u32], weights: &[f32]) -> f32 {
    let n: u32 = observed.iter().sum();
    let total: f32 = weights.iter().sum();
    observed
        .iter()
        .zip(weights)
        .map(|(&o, &w)| {
            let expected = n as f32 * w / total;
            (o as f32 - expected).powi(2) / expected
        })
        .sum()
}

// === SELECTION ===

#[test]
fn test_weighted_pick_converges_to_weights() {
    let weights = [1.0, 2.0, 3.0, 4.0];
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut counts = [0u32; 4];
    for _ in 0..20_000 {
        counts[weighted_pick(&weights, &mut rng).unwrap()] += 1;
    }
    // df = 3, p = 0.001
    assert!(chi_squared(&counts, &weights) < 16.27, "counts {:?}", counts);
}

#[test]
fn test_part_selection_follows_hit_weights() {
    let mut b = BodyPlanBuilder::new("tripod");
    b.add_part(part("body", 6)).unwrap();
    b.add_part(part("left", 3).under("body")).unwrap();
    b.add_part(part("right", 1).under("body")).unwrap();
    let mut c = Creature::new("target", Arc::new(b.seal().unwrap()));

    let resolver = HitResolver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let attack = hit(0.0);
    let mut counts = [0u32; 3];
    for _ in 0..10_000 {
        let outcome = resolver.resolve(&mut c, &attack, &mut rng).unwrap();
        counts[outcome.hit().unwrap().part.index()] += 1;
    }
    // df = 2, p = 0.001
    assert!(chi_squared(&counts, &[6.0, 3.0, 1.0]) < 13.82, "counts {:?}", counts);
}

// === COVERAGE ===

/// Torso with two links to one heart: a primary path that needs deep
/// penetration, and a 10% secondary path open to anything
fn two_link_creature() -> Creature {
    let mut b = BodyPlanBuilder::new("two-link");
    b.add_part(part("torso", 1).integrity(1.0e6)).unwrap();
    b.add_internal(InternalSpec::organ("heart").integrity(1.0e6))
        .unwrap();
    b.add_coverage("torso", "heart", 100.0, true, PenetrationDegree::Major)
        .unwrap();
    b.add_coverage("torso", "heart", 10.0, false, PenetrationDegree::None)
        .unwrap();
    Creature::new("target", Arc::new(b.seal().unwrap()))
}

#[test]
fn test_called_shot_always_uses_primary_link() {
    let mut c = two_link_creature();
    let torso = c.plan().part_by_alias("torso").unwrap();
    let heart = c.plan().structure_by_alias("heart").unwrap();
    let resolver = HitResolver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let attack = hit(1.0).called_shot(heart);
    for _ in 0..500 {
        let outcome = resolver.resolve(&mut c, &attack, &mut rng).unwrap();
        let hit = outcome.hit().unwrap();
        assert_eq!(hit.part, torso);
        assert_eq!(hit.internal, Some(heart));
    }
}

#[test]
fn test_random_hit_sometimes_misses_through_secondary_link() {
    let mut c = two_link_creature();
    let heart = c.plan().structure_by_alias("heart").unwrap();
    let resolver = HitResolver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(12);

    let attack = hit(1.0);
    let mut reached = 0;
    let trials = 2_000;
    for _ in 0..trials {
        let outcome = resolver.resolve(&mut c, &attack, &mut rng).unwrap();
        if outcome.hit().unwrap().internal == Some(heart) {
            reached += 1;
        }
    }
    assert!(reached > 0);
    assert!(reached < trials);
    // Only the 10% gate applies
    let rate = reached as f32 / trials as f32;
    assert!((0.06..0.14).contains(&rate), "rate {}", rate);

    // Deep enough to roll the primary link, which always opens
    let deep = hit(1.0).with_penetration(PenetrationDegree::Major);
    for _ in 0..100 {
        let outcome = resolver.resolve(&mut c, &deep, &mut rng).unwrap();
        assert_eq!(outcome.hit().unwrap().internal, Some(heart));
    }
}

// === ERRORS ===

#[test]
fn test_no_valid_target_is_recoverable() {
    let mut b = BodyPlanBuilder::new("blob");
    b.add_part(part("body", 1)).unwrap();
    let mut c = Creature::new("target", Arc::new(b.seal().unwrap()));
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let filtered = hit(5.0).targeting(
        creature_anatomy::combat::TargetFilter::any().orientation(Orientation::Highest),
    );
    assert_eq!(
        HitResolver::default().resolve(&mut c, &filtered, &mut rng),
        Err(ResolutionError::NoValidTarget)
    );
    // The caller relaxes the filter and tries again
    assert!(HitResolver::default()
        .resolve(&mut c, &hit(5.0), &mut rng)
        .is_ok());
}

#[test]
fn test_missing_binding_leaves_creature_untouched() {
    let mut b = BodyPlanBuilder::new("unfinished");
    // Needs a material the part never gets
    let layer = b.add_layer(
        ArmorLayer::new("needs-density", 1.0)
            .with_fallback(damage_only(Some("damage - density / 1000"), None)),
    );
    b.add_part(part("body", 1).armor(layer)).unwrap();
    let mut c = Creature::new("target", Arc::new(b.seal().unwrap()));
    let body = c.plan().part_by_alias("body").unwrap();

    let padding = ArmorLayer::new("padding", 1.0)
        .with_fallback(damage_only(None, Some("damage * 0.5")));
    c.wear(body, WornArmor::new("gambeson", Arc::new(padding), None, 1.0));

    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let result = HitResolver::default().resolve(&mut c, &hit(10.0), &mut rng);
    assert!(matches!(
        result,
        Err(ResolutionError::MissingBinding { ref layer, ref variable })
            if layer == "needs-density" && variable == "density"
    ));
    assert_eq!(c.part_state(body).damage, 0.0);
    assert_eq!(c.stun(), 0.0);
    assert!(!c.is_dead());
}

#[test]
fn test_bone_formula_literal_case() {
    let bindings: HashMap<String, f32> = [("damage", 10.0), ("quality", 4.0), ("strength", 25000.0)]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    assert_eq!(
        evaluate("damage - (quality * strength/25000 * 0.75)", &bindings),
        Ok(7.0)
    );
}

// === PIPELINE ORDER ===

#[test]
fn test_stage_order_changes_result() {
    let channels = damage_only(Some("damage - 2"), Some("damage * 0.5"));
    let bindings = Bindings::new();
    let incoming = DamageTriple::new(10.0, 0.0, 0.0);

    let canonical = absorb(&channels, dissipate(&channels, incoming, &bindings).unwrap(), &bindings)
        .unwrap();
    let swapped = dissipate(&channels, absorb(&channels, incoming, &bindings).unwrap(), &bindings)
        .unwrap();
    assert_eq!(canonical.damage, 4.0);
    assert_eq!(swapped.damage, 3.0);
    assert_ne!(canonical, swapped);
}

#[test]
fn test_called_shot_through_a_part_that_does_not_cover_it() {
    let mut c = spined_creature();
    let plan = c.shared_plan();
    let arm = plan.part_by_alias("arm").unwrap();
    let neck = plan.part_by_alias("neck").unwrap();
    let cord = plan.structure_by_alias("cord").unwrap();
    let resolver = HitResolver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let cut = AttackDescriptor::new(DamageType::Slashing, DamageTriple::new(8.0, 0.0, 0.0))
        .called_shot(cord);
    assert_eq!(
        resolver.strike(&mut c, arm, &cut, &mut rng),
        Err(ResolutionError::NoValidTarget)
    );
    assert_eq!(c.part_state(arm).damage, 0.0);
    assert_eq!(c.structure_state(cord).damage, 0.0);
    assert_eq!(c.structure_state(cord).status, StructureStatus::Intact);
    for limb in plan.limb_ids() {
        assert!(!c.is_signal_disabled(limb));
    }

    // The neck does cover the cord
    let outcome = resolver.strike(&mut c, neck, &cut, &mut rng).unwrap();
    assert_eq!(outcome.hit().unwrap().internal, Some(cord));
}

// === TOPOLOGY ===

#[test]
fn test_limb_with_a_missing_link_is_rejected() {
    let mut b = BodyPlanBuilder::new("gapped");
    b.add_part(part("shoulder", 3)).unwrap();
    b.add_part(part("arm", 3).under("shoulder")).unwrap();
    b.add_part(part("hand", 2).under("arm")).unwrap();
    b.add_part(part("finger", 1).under("hand")).unwrap();
    b.add_limb(LimbSpec::new("arm", LimbKind::Arm, "shoulder").with_parts(["finger"]))
        .unwrap();
    assert_eq!(
        b.seal().unwrap_err(),
        TopologyError::LimbNotContiguous {
            limb: "arm".to_string(),
            part: "finger".to_string(),
        }
    );

    let mut b = BodyPlanBuilder::new("whole");
    b.add_part(part("shoulder", 3)).unwrap();
    b.add_part(part("arm", 3).under("shoulder")).unwrap();
    b.add_part(part("hand", 2).under("arm")).unwrap();
    b.add_part(part("finger", 1).under("hand")).unwrap();
    b.add_limb(
        LimbSpec::new("arm", LimbKind::Arm, "shoulder").with_parts(["arm", "hand", "finger"]),
    )
    .unwrap();
    let plan = b.seal().unwrap();
    assert_eq!(plan.limb(plan.limb_by_name("arm").unwrap()).parts.len(), 4);
}

// === SEVERING ===

/// Spine in the neck, arms off the chest, one leg off the hips
fn spined_creature() -> Creature {
    let mut b = BodyPlanBuilder::new("spined");
    b.add_part(part("hips", 5)).unwrap();
    b.add_part(part("chest", 5).under("hips")).unwrap();
    b.add_part(part("neck", 2).under("chest").severable_at(10.0))
        .unwrap();
    b.add_part(part("head", 3).under("neck").vital()).unwrap();
    b.add_part(part("arm", 4).under("chest").severable_at(10.0))
        .unwrap();
    b.add_part(part("hand", 2).under("arm")).unwrap();
    b.add_part(part("leg", 4).under("hips")).unwrap();
    b.add_internal(InternalSpec::organ("cord").spinal()).unwrap();
    b.add_coverage("neck", "cord", 20.0, true, PenetrationDegree::Moderate)
        .unwrap();
    b.add_limb(
        LimbSpec::new("arm", LimbKind::Arm, "arm")
            .with_parts(["hand"])
            .with_spine(["cord"]),
    )
    .unwrap();
    b.add_limb(LimbSpec::new("leg", LimbKind::Leg, "leg").with_spine(["cord"]))
        .unwrap();
    b.add_limb(LimbSpec::new("head", LimbKind::Head, "head"))
        .unwrap();
    Creature::new("target", Arc::new(b.seal().unwrap()))
}

#[test]
fn test_sever_removes_exactly_the_subtree() {
    let mut c = spined_creature();
    let plan = c.shared_plan();
    let arm = plan.part_by_alias("arm").unwrap();
    let hand = plan.part_by_alias("hand").unwrap();
    let before = c.targetable_parts();

    let event = sever(&mut c, arm, DetachPolicy::Severed);
    assert_eq!(event.detached, vec![hand]);
    assert!(event.disabled_limbs.is_empty());
    assert!(!event.fatal);

    let after = c.targetable_parts();
    let removed: Vec<_> = before.into_iter().filter(|p| !after.contains(p)).collect();
    assert_eq!(removed, vec![arm, hand]);
}

#[test]
fn test_sever_disables_only_limbs_whose_spine_it_cuts() {
    let mut c = spined_creature();
    let plan = c.shared_plan();
    let neck = plan.part_by_alias("neck").unwrap();
    let arm = plan.limb_by_name("arm").unwrap();
    let leg = plan.limb_by_name("leg").unwrap();
    let head = plan.limb_by_name("head").unwrap();

    let event = sever(&mut c, neck, DetachPolicy::Missing);
    let mut disabled = event.disabled_limbs.clone();
    disabled.sort();
    let mut expected = vec![arm, leg];
    expected.sort();
    assert_eq!(disabled, expected);
    assert!(!c.is_signal_disabled(head));
    // Head was vital
    assert!(event.fatal);
    assert!(c.is_dead());
    assert_eq!(
        c.part_state(plan.part_by_alias("head").unwrap()).status,
        PartStatus::Missing
    );
}

#[test]
fn test_severed_parts_leave_the_selection_pool() {
    let mut c = spined_creature();
    let arm = c.plan().part_by_alias("arm").unwrap();
    let hand = c.plan().part_by_alias("hand").unwrap();
    let resolver = HitResolver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    let cut = AttackDescriptor::new(DamageType::Slashing, DamageTriple::new(15.0, 0.0, 0.0));
    let outcome = resolver.strike(&mut c, arm, &cut, &mut rng).unwrap();
    assert!(outcome.hit().unwrap().severed);

    for _ in 0..200 {
        let outcome = resolver.resolve(&mut c, &hit(0.0), &mut rng).unwrap();
        let struck = outcome.hit().unwrap().part;
        assert_ne!(struck, arm);
        assert_ne!(struck, hand);
    }
    // Striking a detached part directly is a no-op
    assert_eq!(
        resolver.strike(&mut c, hand, &cut, &mut rng).unwrap(),
        StrikeOutcome::Ineffective(IneffectiveReason::PartUnavailable(hand))
    );
}

// === ORGANS ===

#[test]
fn test_organ_destruction_is_terminal() {
    let mut b = BodyPlanBuilder::new("soft");
    // Absorb would fail for lack of a material if it ever ran
    let organ = b.add_layer(
        ArmorLayer::new("organ", 0.0)
            .with_fallback(damage_only(Some("damage"), Some("damage * density"))),
    );
    b.add_part(part("belly", 1).integrity(1.0e6)).unwrap();
    b.add_internal(InternalSpec::organ("liver").integrity(10.0).layer(organ))
        .unwrap();
    b.add_coverage("belly", "liver", 100.0, true, PenetrationDegree::None)
        .unwrap();
    let mut c = Creature::new("target", Arc::new(b.seal().unwrap()));
    let liver = c.plan().structure_by_alias("liver").unwrap();
    let resolver = HitResolver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(31);

    let outcome = resolver.resolve(&mut c, &hit(25.0), &mut rng).unwrap();
    let hit_result = outcome.hit().unwrap();
    let last = hit_result.layers.last().unwrap();
    assert_eq!(last.site, LayerSite::Structure(liver));
    assert_eq!(last.residual, DamageTriple::zero());
    assert_eq!(hit_result.destroyed, vec![liver]);
    assert_eq!(c.structure_state(liver).status, StructureStatus::Destroyed);

    // Later hits stop at the part
    for _ in 0..20 {
        let outcome = resolver.resolve(&mut c, &hit(25.0), &mut rng).unwrap();
        let later = outcome.hit().unwrap();
        assert_eq!(later.internal, None);
        assert_eq!(later.layers.len(), 1);
    }
    assert_eq!(c.structure_state(liver).damage, 25.0);

    assert_eq!(
        resolver
            .resolve(&mut c, &hit(1.0).called_shot(liver), &mut rng)
            .unwrap(),
        StrikeOutcome::Ineffective(IneffectiveReason::StructureDestroyed(liver))
    );
}
