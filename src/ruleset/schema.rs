// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The merge strategy registry: the authoritative schema of the rule
//! document format, keyed by top-level collection name.
//!
//! This table is version-pinned to the OXCE 5.1 rule vocabulary. A key
//! not listed here is a hard error at load time — schema drift must be
//! made explicit by extending this table, never inferred from the
//! shape of runtime values.

/// Named custom merge behavior for the few collections that need
/// deeper semantics than replace/upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomMerge {
    /// Per-language union of string tables (`extraStrings`).
    ExtraStrings,
    /// Concatenate, stamping provenance (`extraSprites`).
    AppendSprites,
    /// Merge was never implemented upstream; left side wins
    /// (`extraSounds`).
    SkipSounds,
    /// Top-level mapping update, incoming keys win (`globe`, `ai`).
    DictUpdate,
}

/// How two values of the same collection combine across load steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Replace wholesale; the previous value is discarded.
    Replace,
    /// Entries are keyed by the named primary-key field; incoming
    /// entries update, insert or delete by key.
    UpsertBy(&'static str),
    /// Delegate to a named merge function.
    Custom(CustomMerge),
}

/// Look up the merge strategy for a collection name.
///
/// Returns `None` for unknown collections; callers treat that as a
/// hard error.
#[must_use]
pub fn strategy_for(collection: &str) -> Option<MergeStrategy> {
    use CustomMerge::{AppendSprites, DictUpdate, ExtraStrings, SkipSounds};
    use MergeStrategy::{Custom, Replace, UpsertBy};

    let strategy = match collection {
        // keyed by `type`
        "items" | "units" | "alienDeployments" | "missionScripts" | "alienMissions" | "ufos"
        | "armors" | "regions" | "facilities" | "interfaces" | "craftWeapons" | "soldiers"
        | "crafts" | "mapScripts" | "countries" | "MCDPatches" | "cutscenes" | "musics"
        | "itemCategories" => UpsertBy("type"),

        // keyed by `id`
        "ufopaedia" | "invs" | "ufoTrajectories" | "alienRaces" => UpsertBy("id"),

        // keyed by `name`
        "research" | "manufacture" | "terrains" => UpsertBy("name"),

        // special cases needing second-tier merges
        "extraStrings" => Custom(ExtraStrings),
        "extraSprites" => Custom(AppendSprites),
        "extraSounds" => Custom(SkipSounds),
        "globe" | "ai" => Custom(DictUpdate),

        // opaque scalars and structures, replaced wholesale.
        // as of oxce 5.1 + pypy3
        "pythonPath" | "customTrainingFactor" | "crewEmergencyEvacuationSurvivalChance"
        // as of oxce+ 4.0
        | "allowCountriesToCancelAlienPact" | "showAllCommendations"
        | "pediaReplaceCraftFuelWithRangeType" | "soldierTransformation"
        // as of oxce+ 3.10
        | "extraNerdyPediaInfo" | "startingDifficulty" | "showFullNameInAlienInventory"
        // as of oxce+ 3.9c
        | "theMostUselessOptionEver" | "theBiggestRipOffEver" | "noLOSAccuracyPenaltyGlobal"
        | "noLOSAccuracyPenaltyCursor" | "costHireScientist" | "costHireEngineer"
        | "psiUnlockResearch" | "customPalettes"
        // as of 3.7a+
        | "showDogfightDistanceInKm" | "useCustomCategories" | "enableCloseQuartersCombat"
        | "closeQuartersAccuracyGlobal" | "closeQuartersEnergyCostGlobal"
        | "closeQuartersTuCostGlobal"
        // as of 3.7
        | "bughuntRank" | "bughuntMinTurn" | "bughuntMaxEnemies" | "bughuntLowMorale"
        | "bughuntTimeUnitsLeft" | "lighting" | "surrenderMode" | "ufoGlancingHitThreshold"
        | "ufoBeamWidthParameter" | "ufoTractorBeamSizeModifier" | "pilotBraveryThresholds"
        | "fixedUserOptions" | "minReactionAccuracy" | "soldiersPerColonel"
        | "soldiersPerCaptain" | "soldiersPerSergeant" | "soldiersPerCommander"
        | "performanceBonusFactor"
        // TFTD
        | "transparencyLUTs" | "soundDefs" | "defeatScore" | "defeatFunds"
        // 3.1 / 3.2
        | "extended" | "commendations" | "converter" | "difficultyCoefficient"
        | "aimAndArmorMultipliers" | "statGrowthMultipliers" | "turnAIUseGrenade"
        | "turnAIUseBlaster" | "constants"
        // as of 2.9
        | "alienItemLevels" | "startingBase" | "startingTime" | "costEngineer"
        | "costScientist" | "timePersonnel" | "initialFunding" | "fontName" | "alienFuel"
        | "maxLookVariant" | "maxViewDistance" | "chanceToStopRetaliation"
        | "tooMuchSmokeThreshold" | "oneHandedPenaltyGlobal" | "kneelBonusGlobal"
        | "monthlyRatings" | "missionRatings" | "startingConditions"
        // mods introduce arbitrary keys under this one; no way to merge
        | "statStrings" => Replace,

        _ => return None,
    };
    Some(strategy)
}
