//! Layer pipeline: transform → dissipate → absorb
//!
//! Stage order is fixed. Dissipate decides what the layer itself suffers;
//! absorb, run over the dissipated values, decides what reaches the next
//! layer down. Terminal layers (organs) have no absorb stage.

use super::damage_type::DamageType;
use super::layer::{ArmorLayer, Channel, ChannelSet, DamageTriple};
use super::material::Material;
use super::severity::SeverityTable;
use crate::core::error::FormulaError;
use crate::formula::{Bindings, Formula, Variable};

/// Everything a layer's formulas can see besides the triple itself
#[derive(Debug, Clone, Copy)]
pub struct PipelineContext<'a> {
    pub severity: &'a SeverityTable,
    /// Attack-wide bindings: angle and trait values
    pub base: &'a Bindings,
    pub quality: f32,
    pub material: Option<&'a Material>,
    /// No absorb stage; nothing passes deeper
    pub terminal: bool,
}

/// What one layer did to an incoming attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOutcome {
    /// Damage type after any transform; carried to deeper layers
    pub damage_type: DamageType,
    pub transformed: bool,
    /// What the layer itself takes
    pub suffered: DamageTriple,
    /// What passes to the next layer
    pub residual: DamageTriple,
}

/// Run one layer over an incoming triple
pub fn resolve(
    layer: &ArmorLayer,
    damage_type: DamageType,
    incoming: DamageTriple,
    ctx: &PipelineContext<'_>,
) -> Result<LayerOutcome, FormulaError> {
    let effective = transform(layer, damage_type, incoming, ctx.severity);
    let channels = layer.channels_for(effective);
    let bindings = layer_bindings(ctx);

    let suffered = dissipate(channels, incoming, &bindings)?;
    let residual = if ctx.terminal {
        DamageTriple::zero()
    } else {
        absorb(channels, suffered, &bindings)?
    };

    Ok(LayerOutcome {
        damage_type: effective,
        transformed: effective != damage_type,
        suffered,
        residual,
    })
}

/// Stage 1: rewrite the damage type if a rule applies at this severity
pub fn transform(
    layer: &ArmorLayer,
    damage_type: DamageType,
    incoming: DamageTriple,
    severity: &SeverityTable,
) -> DamageType {
    layer
        .transform_for(damage_type, severity.severity(incoming.damage))
        .unwrap_or(damage_type)
}

/// Stage 2: what the layer suffers, clamped at zero
pub fn dissipate(
    channels: &ChannelSet,
    incoming: DamageTriple,
    bindings: &Bindings,
) -> Result<DamageTriple, FormulaError> {
    run_stage(incoming, bindings, move |channel| {
        channels.get(channel).dissipate.as_ref()
    })
}

/// Stage 4: what passes deeper, evaluated over the dissipated values
pub fn absorb(
    channels: &ChannelSet,
    dissipated: DamageTriple,
    bindings: &Bindings,
) -> Result<DamageTriple, FormulaError> {
    run_stage(dissipated, bindings, move |channel| {
        channels.get(channel).absorb.as_ref()
    })
}

fn run_stage<'f, F>(
    input: DamageTriple,
    bindings: &Bindings,
    formula_for: F,
) -> Result<DamageTriple, FormulaError>
where
    F: Fn(Channel) -> Option<&'f Formula>,
{
    let mut bindings = bindings.clone();
    bindings
        .set(Variable::Damage, input.damage)
        .set(Variable::Pain, input.pain)
        .set(Variable::Stun, input.stun);

    let mut output = DamageTriple::zero();
    for channel in Channel::all() {
        let value = match formula_for(channel) {
            Some(formula) => formula.eval(&bindings)?,
            None => input.get(channel),
        };
        output.set(channel, value.max(0.0));
    }
    Ok(output)
}

/// Attack-wide bindings plus this layer's quality and material
pub fn layer_bindings(ctx: &PipelineContext<'_>) -> Bindings {
    let mut bindings = ctx.base.clone();
    bindings.set(Variable::Quality, ctx.quality);
    match ctx.material {
        Some(material) => material.bind(&mut bindings),
        None => Material::unbind(&mut bindings),
    }
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armor::layer::{ChannelFormulas, TransformRule};
    use crate::armor::Severity;

    fn steel() -> Material {
        Material {
            name: "steel".to_string(),
            density: 7850.0,
            electrical: 1.4,
            thermal: 50.0,
            organic: false,
            strength: 25000.0,
        }
    }

    fn formulas(dissipate: Option<&str>, absorb: Option<&str>) -> ChannelFormulas {
        ChannelFormulas {
            dissipate: dissipate.map(|f| Formula::compile(f).unwrap()),
            absorb: absorb.map(|f| Formula::compile(f).unwrap()),
        }
    }

    fn plate() -> ArmorLayer {
        ArmorLayer::new("plate", 4.0).with_fallback(ChannelSet::uniform(formulas(
            Some("damage - (quality * strength/25000 * 0.75)"),
            Some("damage * 0.5"),
        )))
    }

    fn context<'a>(
        severity: &'a SeverityTable,
        base: &'a Bindings,
        material: Option<&'a Material>,
        terminal: bool,
    ) -> PipelineContext<'a> {
        PipelineContext {
            severity,
            base,
            quality: 4.0,
            material,
            terminal,
        }
    }

    #[test]
    fn test_canonical_order() {
        let table = SeverityTable::default();
        let base = Bindings::new();
        let material = steel();
        let ctx = context(&table, &base, Some(&material), false);

        let outcome = resolve(
            &plate(),
            DamageType::Slashing,
            DamageTriple::uniform(10.0),
            &ctx,
        )
        .unwrap();

        assert_eq!(outcome.suffered, DamageTriple::uniform(7.0));
        assert_eq!(outcome.residual, DamageTriple::uniform(3.5));
        assert!(!outcome.transformed);
    }

    #[test]
    fn test_dissipate_clamps_at_zero() {
        let table = SeverityTable::default();
        let base = Bindings::new();
        let material = steel();
        let ctx = context(&table, &base, Some(&material), false);

        let outcome = resolve(&plate(), DamageType::Slashing, DamageTriple::uniform(2.0), &ctx)
            .unwrap();
        assert_eq!(outcome.suffered, DamageTriple::zero());
        assert_eq!(outcome.residual, DamageTriple::zero());
    }

    #[test]
    fn test_terminal_layer_passes_nothing() {
        let table = SeverityTable::default();
        let base = Bindings::new();
        let material = steel();
        let ctx = context(&table, &base, Some(&material), true);

        let outcome = resolve(&plate(), DamageType::Slashing, DamageTriple::uniform(10.0), &ctx)
            .unwrap();
        assert_eq!(outcome.suffered, DamageTriple::uniform(7.0));
        assert_eq!(outcome.residual, DamageTriple::zero());
    }

    #[test]
    fn test_missing_material_binding() {
        let table = SeverityTable::default();
        let base = Bindings::new();
        let ctx = context(&table, &base, None, false);

        let result = resolve(&plate(), DamageType::Slashing, DamageTriple::uniform(10.0), &ctx);
        assert_eq!(
            result,
            Err(FormulaError::MissingBinding("strength".to_string()))
        );
    }

    #[test]
    fn test_transform_switches_formulas() {
        let hide = ArmorLayer::new("hide", 1.0)
            .with_transform(TransformRule {
                from: DamageType::Piercing,
                to: DamageType::Crushing,
                ceiling: Severity::Moderate,
            })
            .with_override(
                DamageType::Crushing,
                ChannelSet::uniform(formulas(Some("damage * 0.5"), None)),
            );
        let table = SeverityTable::default();
        let base = Bindings::new();
        let ctx = context(&table, &base, None, false);

        // 10 is Moderate: rewritten to crushing, halved
        let light = resolve(&hide, DamageType::Piercing, DamageTriple::uniform(10.0), &ctx)
            .unwrap();
        assert!(light.transformed);
        assert_eq!(light.damage_type, DamageType::Crushing);
        assert_eq!(light.suffered.damage, 5.0);

        // 30 is Grievous: stays piercing, passes through
        let heavy = resolve(&hide, DamageType::Piercing, DamageTriple::uniform(30.0), &ctx)
            .unwrap();
        assert!(!heavy.transformed);
        assert_eq!(heavy.damage_type, DamageType::Piercing);
        assert_eq!(heavy.suffered.damage, 30.0);
    }

    #[test]
    fn test_channels_evaluated_independently() {
        let layer = ArmorLayer::new("padding", 1.0).with_fallback(ChannelSet {
            damage: formulas(Some("damage - 2"), None),
            pain: formulas(Some("pain * 0.5"), None),
            stun: formulas(None, Some("0")),
        });
        let table = SeverityTable::default();
        let base = Bindings::new();
        let ctx = context(&table, &base, None, false);

        let outcome = resolve(&layer, DamageType::Crushing, DamageTriple::new(6.0, 8.0, 4.0), &ctx)
            .unwrap();
        assert_eq!(outcome.suffered, DamageTriple::new(4.0, 4.0, 4.0));
        assert_eq!(outcome.residual, DamageTriple::new(4.0, 4.0, 0.0));
    }

    #[test]
    fn test_stage_order_matters() {
        let set = ChannelSet::uniform(formulas(Some("damage - 5"), Some("damage * 0.5")));
        let bindings = Bindings::new();
        let input = DamageTriple::uniform(10.0);

        let canonical = absorb(&set, dissipate(&set, input, &bindings).unwrap(), &bindings).unwrap();
        let reversed = dissipate(&set, absorb(&set, input, &bindings).unwrap(), &bindings).unwrap();

        assert_eq!(canonical.damage, 2.5);
        assert_eq!(reversed.damage, 0.0);
        assert_ne!(canonical, reversed);
    }
}
