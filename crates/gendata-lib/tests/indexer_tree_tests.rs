use gendata_lib::indexer::{index_generated_data, IndexOptions};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn put(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn fixture(root: &Path) {
    put(
        root,
        "reports/blocks.json",
        &json!({
            "minecraft:oak_log": {
                "properties": {"axis": ["x", "y", "z"]},
                "states": [
                    {"id": 1, "properties": {"axis": "x"}},
                    {"id": 2, "default": true, "properties": {"axis": "y"}},
                    {"id": 3, "properties": {"axis": "z"}}
                ]
            },
            "minecraft:stone": {"states": [{"id": 0, "default": true}]}
        })
        .to_string(),
    );
    put(
        root,
        "reports/commands.json",
        &json!({
            "type": "root",
            "children": {
                "give": {"type": "literal", "executable": true, "children": {
                    "run": {"type": "argument", "parser": "brigadier:string", "executable": true}
                }}
            }
        })
        .to_string(),
    );
    put(
        root,
        "reports/registries.json",
        &json!({
            "minecraft:block": {"entries": {"minecraft:stone": {"protocol_id": 1}, "minecraft:oak_log": {"protocol_id": 2}}}
        })
        .to_string(),
    );
    put(root, "data/minecraft/tags/blocks/mytag.json", r#"{"values": []}"#);
    put(root, "data/minecraft/tags/blocks/logs.json", r#"{"values": []}"#);
    put(
        root,
        "data/minecraft/loot_tables/chests/simple.json",
        r#"{"pools": [{"items": [{"item": "stone"}, {"item": "dirt"}]}]}"#,
    );
    put(
        root,
        "data/minecraft/loot_tables/blocks/stone.json",
        r#"{"pools": [{"items": [{"item": "stone"}]}]}"#,
    );
    put(root, "data/minecraft/structures/igloo/top.nbt", "");
    put(root, "data/minecraft/worldgen/biome/plains.json", "{}");
    put(root, "data/minecraft/damage_type/arrow.json", "{}");
    put(
        root,
        "assets/minecraft/sounds.json",
        r#"{"block.stone.break": {"sounds": ["dig/stone1"]}}"#,
    );
    put(
        root,
        "assets/pack.mcmeta",
        r#"{"language": {"en_US": {"name": "English"}, "de_DE": {"name": "Deutsch"}}}"#,
    );
}

fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root.join("lists"))
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join("lists").join(relative)).unwrap()
}

#[test]
fn full_tree_listing() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fixture(root);

    let report = index_generated_data(root, &IndexOptions::default()).unwrap();
    assert_eq!(report.blocks, 2);
    assert_eq!(report.commands, 1);
    assert_eq!(report.registries, 1);
    assert_eq!(report.loot_tables, 1);

    assert_eq!(read(root, "loot_tables/chests/simple.txt"), "minecraft:stone\nminecraft:dirt\n");
    assert!(!root.join("lists/loot_tables/blocks").exists());
    assert_eq!(read(root, "commands/give.txt"), "give\ngive <run brigadier:string>\n");
    assert_eq!(read(root, "command_argument_type.txt"), "brigadier:string\n");
    assert_eq!(
        read(root, "block.txt"),
        "minecraft:oak_log\nminecraft:stone\n#minecraft:logs\n#minecraft:mytag\n"
    );
    assert_eq!(read(root, "blocks/states/oak_log.txt"), "axis=x\naxis=y  [default]\naxis=z\n");
    assert_eq!(read(root, "structures.nbt.txt"), "minecraft:igloo/top\n");
    assert_eq!(read(root, "worldgen/biome.txt"), "minecraft:plains\n");
    assert_eq!(read(root, "damage_type.txt"), "minecraft:arrow\n");
    assert_eq!(read(root, "sounds/block.stone.break.txt"), "minecraft:dig/stone1\n");
    assert!(read(root, "languages.json").starts_with("{\n  \"en_us\""));
    assert!(!root.join("assets/pack.mcmeta").exists());
}

#[test]
fn rerun_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fixture(root);

    index_generated_data(root, &IndexOptions::default()).unwrap();
    let first = snapshot(root);
    index_generated_data(root, &IndexOptions::default()).unwrap();
    let second = snapshot(root);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn loot_exclusion_is_configurable() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fixture(root);

    let options = IndexOptions {
        excluded_loot_prefixes: vec!["chests".to_string()],
        ..IndexOptions::default()
    };
    index_generated_data(root, &options).unwrap();
    assert_eq!(read(root, "loot_tables/blocks/stone.txt"), "minecraft:stone\n");
    assert!(!root.join("lists/loot_tables/chests").exists());
}

#[test]
fn argument_type_registry_merges_with_command_parsers() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    put(
        root,
        "reports/registries.json",
        &json!({
            "minecraft:command_argument_type": {"entries": {
                "minecraft:message": {"protocol_id": 1},
                "brigadier:bool": {"protocol_id": 0}
            }}
        })
        .to_string(),
    );
    put(
        root,
        "reports/commands.json",
        &json!({
            "type": "root",
            "children": {
                "say": {"type": "literal", "children": {
                    "message": {"type": "argument", "parser": "minecraft:message", "executable": true}
                }},
                "seed": {"type": "literal", "children": {
                    "raw": {"type": "argument", "parser": "brigadier:string", "executable": true}
                }}
            }
        })
        .to_string(),
    );

    let report = index_generated_data(root, &IndexOptions::default()).unwrap();
    assert_eq!(report.commands, 2);
    assert_eq!(report.registries, 1);
    assert_eq!(
        read(root, "command_argument_type.txt"),
        "brigadier:bool\nbrigadier:string\nminecraft:message\n"
    );
    assert_eq!(read(root, "registries.txt"), "minecraft:command_argument_type\n");
}
