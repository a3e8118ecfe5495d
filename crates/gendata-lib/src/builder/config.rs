//! Static builder settings: endpoints, scratch layout and the category lists
//! the indexer walks. Runtime options live in `BuildSpec` / `IndexOptions`.

// URL Constants
pub const VANILLA_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

/// Scratch directory name under the system temp dir.
pub const SCRATCH_DIR_NAME: &str = "MC Generated data";
/// Working tree inside the per-version scratch directory.
pub const GENERATED_DIR: &str = "generated";
/// Index output root inside the working tree.
pub const LISTS_DIR: &str = "lists";

pub const CLIENT_JAR: &str = "client.jar";
pub const SERVER_JAR: &str = "server.jar";
pub const ASSET_INDEX_FILE: &str = "assets.json";
pub const BUNDLE_TMP_FILE: &str = "zip.zip";

/// First release year shipping the data generator in the server jar.
pub const DATA_GENERATOR_SINCE_YEAR: i32 = 2018;
pub const DATA_GENERATOR_COMMANDS: &[&[&str]] = &[
    &[
        "-DbundlerMainClass=net.minecraft.data.Main",
        "-jar",
        SERVER_JAR,
        "--all",
    ],
    &["-cp", SERVER_JAR, "net.minecraft.data.Main", "--all"],
];

/// Leftovers of the data generator run, relative to the scratch directory.
pub const SCRATCH_LEFTOVERS: &[&str] = &[
    "libraries",
    "logs",
    "tmp",
    "versions",
    "generated/.cache",
    "generated/tmp",
    "generated/assets/.mcassetsroot",
    "generated/data/.mcassetsroot",
];

/// Auxiliary assets fetched from the asset index after extraction.
pub const AUXILIARY_ASSETS: &[&str] = &["minecraft/sounds.json", "sounds.json", "pack.mcmeta"];
pub const TEXTURE_ASSET_PREFIX: &str = "minecraft/textures";
/// Loose files relocated under `assets/` for archives without an `assets/` root.
pub const LEGACY_ASSET_EXTENSIONS: &[&str] = &[".png", ".txt", ".lang"];

pub const DEFAULT_NAMESPACE: &str = "minecraft";
pub const DATAPACKS_DIR: &str = "data/minecraft/datapacks";
pub const TAGS_DIR: &str = "data/minecraft/tags";

pub const STRUCTURE_DIRS: &[&str] = &[
    "data/minecraft/structure",
    "data/minecraft/structures",
    "assets/minecraft/structures",
];
pub const LOOT_TABLE_DIRS: &[&str] = &[
    "data/minecraft/loot_table",
    "data/minecraft/loot_tables",
    "assets/minecraft/loot_tables",
];
pub const WORLDGEN_DIRS: &[&str] = &[
    "data/minecraft/worldgen",
    "reports/minecraft/worldgen",
    "reports/worldgen/minecraft/worldgen",
];
pub const LEGACY_BIOMES_DIR: &str = "reports/biomes";

/// Data categories absent from `registries.json` but listed like registries.
pub const FLAT_CATEGORIES: &[&str] = &["trim_material", "trim_pattern", "damage_type"];
pub const EXCLUDED_LOOT_PREFIXES: &[&str] = &["blocks"];

pub const BLOCKS_REPORT: &str = "reports/blocks.json";
pub const COMMANDS_REPORT: &str = "reports/commands.json";
pub const REGISTRIES_REPORT: &str = "reports/registries.json";
pub const SOUNDS_FILES: &[&str] = &["assets/minecraft/sounds.json", "assets/sounds.json"];
pub const PACK_MCMETA: &str = "assets/pack.mcmeta";

/// Argument names allowed to carry the `unknown` node type in `commands.json`.
pub const UNKNOWN_ARGUMENT_ALLOWLIST: &[&str] = &["dimension", "angle"];
