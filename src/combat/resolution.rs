//! Hit location resolution
//!
//! Targeting → ExternalSelection → InternalPenetration → Resolved.
//!
//! Every layer the attack passes through is computed first; creature state is
//! only written once the whole strike has resolved. A formula failure on any
//! layer leaves the creature untouched.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::attack::AttackDescriptor;
use super::selection::{gate, weighted_pick};
use super::severing::{apply_structure_loss, sever, SeverEvent, StructureLoss};
use crate::anatomy::instance::Creature;
use crate::anatomy::plan::BodyPlan;
use crate::armor::{
    pipeline, ArmorLayer, DamageTriple, DamageType, LayerOutcome, Material, PipelineContext,
};
use crate::core::config::{config, ResolverConfig};
use crate::core::error::{FormulaError, ResolutionError};
use crate::core::types::{LimbId, PartId, StructureId};
use crate::formula::{Bindings, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Targeting,
    ExternalSelection,
    InternalPenetration,
    Resolved,
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionStage::Targeting => "targeting",
            ResolutionStage::ExternalSelection => "external_selection",
            ResolutionStage::InternalPenetration => "internal_penetration",
            ResolutionStage::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

/// Where a layer sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSite {
    /// Item `index` worn on the part, outermost is 0
    Worn { part: PartId, index: usize },
    Part(PartId),
    Structure(StructureId),
}

/// One layer's share of a strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    pub site: LayerSite,
    pub layer: String,
    pub damage_type: DamageType,
    pub transformed: bool,
    pub incoming: DamageTriple,
    pub suffered: DamageTriple,
    pub residual: DamageTriple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitResolution {
    pub part: PartId,
    /// Deepest structure the strike reached
    pub internal: Option<StructureId>,
    /// Damage type as it left the last layer
    pub damage_type: DamageType,
    /// Outermost first
    pub layers: Vec<LayerReport>,
    /// What the deepest layer suffered
    pub final_triple: DamageTriple,
    pub severed: bool,
    pub sever: Option<SeverEvent>,
    pub destroyed: Vec<StructureId>,
    pub broken: Vec<StructureId>,
    pub disabled_limbs: Vec<LimbId>,
    pub fatal: bool,
}

/// Why a strike did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneffectiveReason {
    /// Part is already severed or missing
    PartUnavailable(PartId),
    /// Called shot on an organ that is already destroyed
    StructureDestroyed(StructureId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeOutcome {
    Hit(Box<HitResolution>),
    Ineffective(IneffectiveReason),
}

impl StrikeOutcome {
    pub fn hit(&self) -> Option<&HitResolution> {
        match self {
            StrikeOutcome::Hit(hit) => Some(hit),
            StrikeOutcome::Ineffective(_) => None,
        }
    }
}

/// Resolves attacks against creatures
#[derive(Debug, Clone, Default)]
pub struct HitResolver {
    config: ResolverConfig,
}

impl HitResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolver using the process-wide config
    pub fn from_global() -> Self {
        Self::new(config().clone())
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one attack, choosing the struck part at random
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        creature: &mut Creature,
        attack: &AttackDescriptor,
        rng: &mut R,
    ) -> Result<StrikeOutcome, ResolutionError> {
        trace!(stage = %ResolutionStage::Targeting, creature = %creature.name());
        let plan = creature.shared_plan();

        let candidates: Vec<PartId> = match attack.called_shot {
            Some(structure) => {
                if creature.is_destroyed(structure) {
                    return Ok(StrikeOutcome::Ineffective(
                        IneffectiveReason::StructureDestroyed(structure),
                    ));
                }
                let part = called_part(&plan, structure);
                if !creature.is_targetable(part) {
                    return Ok(StrikeOutcome::Ineffective(
                        IneffectiveReason::PartUnavailable(part),
                    ));
                }
                if attack.filter.matches(plan.part(part)) {
                    vec![part]
                } else {
                    Vec::new()
                }
            }
            None => creature
                .targetable_parts()
                .into_iter()
                .filter(|&part| attack.filter.matches(plan.part(part)))
                .collect(),
        };

        trace!(stage = %ResolutionStage::ExternalSelection, candidates = candidates.len());
        let part = match candidates.as_slice() {
            [] => return Err(ResolutionError::NoValidTarget),
            [only] if attack.called_shot.is_some() => *only,
            _ => {
                let weights: Vec<f32> = candidates
                    .iter()
                    .map(|&p| plan.part(p).hit_weight as f32)
                    .collect();
                let index = weighted_pick(&weights, rng).ok_or(ResolutionError::NoValidTarget)?;
                candidates[index]
            }
        };

        self.strike(creature, part, attack, rng)
    }

    /// Resolve an attack against a specific part, skipping targeting
    pub fn strike<R: Rng + ?Sized>(
        &self,
        creature: &mut Creature,
        part: PartId,
        attack: &AttackDescriptor,
        rng: &mut R,
    ) -> Result<StrikeOutcome, ResolutionError> {
        if !creature.is_targetable(part) {
            return Ok(StrikeOutcome::Ineffective(IneffectiveReason::PartUnavailable(
                part,
            )));
        }
        let plan = creature.shared_plan();

        trace!(stage = %ResolutionStage::InternalPenetration, part = %plan.part(part).alias);
        let struck = match attack.called_shot {
            Some(structure) if plan.coverage().exposes(part, structure) => Some(structure),
            Some(_) => return Err(ResolutionError::NoValidTarget),
            None => roll_internal(creature, &plan, part, attack, rng),
        };

        let mut base = Bindings::new()
            .with(Variable::Angle, attack.angle)
            .with_traits(creature.traits());
        base.set(Variable::Degree, attack.penetration.as_value());

        let planned = self.plan_layers(creature, &plan, part, struck, attack, &base, rng)?;
        let resolution = self.commit(creature, &plan, part, attack.damage_type, planned);

        trace!(
            stage = %ResolutionStage::Resolved,
            part = %plan.part(part).alias,
            internal = ?resolution.internal,
            severed = resolution.severed,
            fatal = resolution.fatal
        );
        Ok(StrikeOutcome::Hit(Box::new(resolution)))
    }

    /// Compute every layer the attack reaches; touches no state
    #[allow(clippy::too_many_arguments)]
    fn plan_layers<R: Rng + ?Sized>(
        &self,
        creature: &Creature,
        plan: &BodyPlan,
        part: PartId,
        struck: Option<StructureId>,
        attack: &AttackDescriptor,
        base: &Bindings,
        rng: &mut R,
    ) -> Result<Vec<LayerReport>, ResolutionError> {
        let mut out = Vec::new();
        let mut damage_type = attack.damage_type;
        let mut incoming = attack.amount;

        for (index, worn) in creature.worn_on(part).iter().enumerate() {
            let ctx = self.context(base, worn.quality, worn.material.as_ref(), false);
            let outcome = run_layer(&worn.layer, damage_type, incoming, &ctx)?;
            out.push(report(LayerSite::Worn { part, index }, &worn.name, incoming, &outcome));
            damage_type = outcome.damage_type;
            incoming = outcome.residual;
            if incoming.is_zero() {
                return Ok(out);
            }
        }

        let def = plan.part(part);
        let material = def.material.map(|m| plan.material(m));
        let outcome = match def.armor {
            Some(layer) => {
                let layer = plan.layer(layer);
                let ctx = self.context(base, layer.quality, material, false);
                run_layer(layer, damage_type, incoming, &ctx)?
            }
            None => passthrough(damage_type, incoming, false),
        };
        out.push(report(LayerSite::Part(part), &def.name, incoming, &outcome));
        damage_type = outcome.damage_type;
        incoming = outcome.residual;

        let Some(target) = struck else {
            return Ok(out);
        };
        if incoming.is_zero() {
            return Ok(out);
        }

        // Organs under an intact bone exposed by this part meet the bone first
        let mut chain = Vec::with_capacity(2);
        if plan.internal(target).is_organ() && self.config.bone_interception {
            let interceptor = plan.coverage().bone_coverage_for(target).find(|cover| {
                creature.is_shielding(cover.bone)
                    && plan.coverage().exposes(part, cover.bone)
                    && gate(cover.coverage, rng)
            });
            if let Some(cover) = interceptor {
                chain.push(cover.bone);
            }
        }
        chain.push(target);

        let mut index = 0;
        while index < chain.len() {
            let structure = chain[index];
            let def = plan.internal(structure);
            let material = def.material.map(|m| plan.material(m));
            let terminal = def.is_organ();
            let outcome = match def.layer {
                Some(layer) => {
                    let layer = plan.layer(layer);
                    let ctx = self.context(base, layer.quality, material, terminal);
                    run_layer(layer, damage_type, incoming, &ctx)?
                }
                None => passthrough(damage_type, incoming, terminal),
            };
            out.push(report(LayerSite::Structure(structure), &def.name, incoming, &outcome));
            damage_type = outcome.damage_type;
            incoming = outcome.residual;
            if incoming.is_zero() {
                break;
            }

            // A bone struck directly may pass on to an organ it covers
            if index + 1 == chain.len() && def.is_bone() {
                let organ = plan
                    .coverage()
                    .organs_under(structure)
                    .find(|cover| {
                        !creature.is_destroyed(cover.organ)
                            && plan.coverage().exposes(part, cover.organ)
                            && gate(cover.coverage, rng)
                    });
                if let Some(cover) = organ {
                    chain.push(cover.organ);
                }
            }
            index += 1;
        }

        Ok(out)
    }

    fn context<'a>(
        &'a self,
        base: &'a Bindings,
        quality: f32,
        material: Option<&'a Material>,
        terminal: bool,
    ) -> PipelineContext<'a> {
        PipelineContext {
            severity: &self.config.severity,
            base,
            quality,
            material,
            terminal,
        }
    }

    /// Apply the planned layers to the creature
    fn commit(
        &self,
        creature: &mut Creature,
        plan: &BodyPlan,
        part: PartId,
        damage_type: DamageType,
        planned: Vec<LayerReport>,
    ) -> HitResolution {
        let mut loss = StructureLoss::default();
        let mut internal = None;
        let mut severing_type = damage_type;
        let mut final_type = damage_type;
        let mut final_triple = DamageTriple::zero();

        for report in &planned {
            final_type = report.damage_type;
            final_triple = report.suffered;
            match report.site {
                LayerSite::Worn { .. } => {}
                LayerSite::Part(p) => {
                    let state = creature.part_state_mut(p);
                    state.damage += report.suffered.damage;
                    state.pain += report.suffered.pain;
                    creature.add_stun(report.suffered.stun);
                    severing_type = report.damage_type;
                }
                LayerSite::Structure(s) => {
                    let state = creature.structure_state_mut(s);
                    state.damage += report.suffered.damage;
                    state.pain += report.suffered.pain;
                    creature.add_stun(report.suffered.stun);
                    internal = Some(s);
                    apply_structure_loss(creature, s, &mut loss);
                }
            }
        }

        let threshold = plan.part(part).sever_threshold;
        let sever_event = match threshold {
            Some(threshold)
                if self.config.severing_enabled
                    && severing_type.can_sever()
                    && creature.part_state(part).damage >= threshold =>
            {
                Some(sever(creature, part, self.config.detach_policy))
            }
            _ => None,
        };

        let mut disabled_limbs = loss.disabled_limbs;
        let mut fatal = loss.fatal;
        if let Some(event) = &sever_event {
            disabled_limbs.extend(event.disabled_limbs.iter().copied());
            fatal |= event.fatal;
        }

        HitResolution {
            part,
            internal,
            damage_type: final_type,
            layers: planned,
            final_triple,
            severed: sever_event.is_some(),
            sever: sever_event,
            destroyed: loss.destroyed,
            broken: loss.broken,
            disabled_limbs,
            fatal,
        }
    }
}

/// One attack per creature, resolved in parallel
///
/// Creature `i` is struck by `attacks[i]` with its own RNG stream derived
/// from `seed` and `i`, so results do not depend on thread scheduling.
/// Extra creatures or attacks beyond the shorter slice are ignored.
pub fn resolve_volley(
    resolver: &HitResolver,
    targets: &mut [Creature],
    attacks: &[AttackDescriptor],
    seed: u64,
) -> Vec<Result<StrikeOutcome, ResolutionError>> {
    targets
        .par_iter_mut()
        .zip(attacks.par_iter())
        .enumerate()
        .map(|(index, (creature, attack))| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(index as u64);
            resolver.resolve(creature, attack, &mut rng)
        })
        .collect()
}

/// Part a called shot on `structure` lands on
fn called_part(plan: &BodyPlan, structure: StructureId) -> PartId {
    match plan.coverage().guaranteed_link(structure) {
        Some(link) => link.part,
        None => plan.host_of(structure),
    }
}

/// Roll the part's coverage links in declaration order; first gate to open wins
fn roll_internal<R: Rng + ?Sized>(
    creature: &Creature,
    plan: &BodyPlan,
    part: PartId,
    attack: &AttackDescriptor,
    rng: &mut R,
) -> Option<StructureId> {
    plan.coverage()
        .links_on(part)
        .filter(|link| attack.penetration >= link.min_penetration)
        .filter(|link| !creature.is_destroyed(link.structure))
        .find(|link| gate(link.hit_chance, rng))
        .map(|link| link.structure)
}

fn run_layer(
    layer: &ArmorLayer,
    damage_type: DamageType,
    incoming: DamageTriple,
    ctx: &PipelineContext<'_>,
) -> Result<LayerOutcome, ResolutionError> {
    pipeline::resolve(layer, damage_type, incoming, ctx).map_err(|source| match source {
        FormulaError::MissingBinding(variable) => ResolutionError::MissingBinding {
            layer: layer.name.clone(),
            variable,
        },
        source => ResolutionError::Formula {
            layer: layer.name.clone(),
            source,
        },
    })
}

/// A location with no layer takes everything and passes it on unless terminal
fn passthrough(damage_type: DamageType, incoming: DamageTriple, terminal: bool) -> LayerOutcome {
    LayerOutcome {
        damage_type,
        transformed: false,
        suffered: incoming,
        residual: if terminal { DamageTriple::zero() } else { incoming },
    }
}

fn report(site: LayerSite, name: &str, incoming: DamageTriple, outcome: &LayerOutcome) -> LayerReport {
    LayerReport {
        site,
        layer: name.to_string(),
        damage_type: outcome.damage_type,
        transformed: outcome.transformed,
        incoming,
        suffered: outcome.suffered,
        residual: outcome.residual,
    }
}
