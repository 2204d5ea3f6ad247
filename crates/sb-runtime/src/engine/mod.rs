use std::collections::BTreeMap;
use std::sync::Arc;

use sb_core::{
    read_path, split_path, GroupKind, Instruction, InstructionKind, Point, Script, ScriptError,
    SpriteDefinition, SpriteHost, SpriteRef, Value,
};

include!("context.rs");
include!("step.rs");
include!("guard.rs");
include!("invoke.rs");
include!("../helpers/value_path.rs");
include!("tests.rs");
