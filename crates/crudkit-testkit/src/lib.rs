// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use crudkit_app::{
    ByPath, Cell, Choice, Control, ControlContext, CrudBackend, CrudSignal, EntityKey, EntityType,
    FieldPath, FieldSpec, InputKind, Operation, PathError, RowContext, RowIdentity, Schema, Tone,
};
use serde_json::{Map, Value, json};
use std::sync::mpsc::Sender;
use time::OffsetDateTime;
use tracing::debug;

const WORLD_NAMES: [&str; 6] = [
    "world",
    "world_nether",
    "world_the_end",
    "creative",
    "skyblock",
    "hub",
];

const JAIL_NAMES: [&str; 14] = [
    "Alcatraz",
    "Blackgate",
    "Stormcage",
    "Ironhold",
    "Deepwell",
    "Cinderkeep",
    "Frostbite",
    "Highwall",
    "Lowmoor",
    "Redstone",
    "Obsidian",
    "Bedrock",
    "Netherbar",
    "Endcell",
];

pub const JAIL_TYPE: &str = "jail/jail";

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub uuid: String,
    pub name: String,
}

impl World {
    pub fn to_value(&self) -> Value {
        json!({"uuid": self.uuid, "name": self.name})
    }
}

/// Seeded generator of worlds and jails. The same seed always yields the
/// same fixtures.
#[derive(Debug, Clone)]
pub struct JailFaker {
    rng: DeterministicRng,
    jails_made: usize,
}

impl JailFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            jails_made: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn worlds(&mut self, count: usize) -> Vec<World> {
        (0..count.min(WORLD_NAMES.len()))
            .map(|index| World {
                uuid: self.uuid(),
                name: WORLD_NAMES[index].to_owned(),
            })
            .collect()
    }

    pub fn jail(&mut self, worlds: &[World]) -> Value {
        self.jails_made += 1;
        let base = JAIL_NAMES[self.rng.int_n(JAIL_NAMES.len())];
        let name = format!("{base}{}", self.jails_made);
        let Some(world) = worlds.get(self.rng.int_n(worlds.len())) else {
            return json!({"name": name});
        };
        json!({
            "name": name,
            "location": {
                "world": world.to_value(),
                "position": {
                    "x": self.coordinate(-2000, 2000),
                    "y": self.coordinate(5, 250),
                    "z": self.coordinate(-2000, 2000),
                },
            },
        })
    }

    pub fn jails(&mut self, count: usize, worlds: &[World]) -> Vec<Value> {
        (0..count).map(|_| self.jail(worlds)).collect()
    }

    fn coordinate(&mut self, min: i64, max: i64) -> f64 {
        let span = (max - min + 1) as u64;
        let whole = min + (self.rng.next_u64() % span) as i64;
        let tenths = (self.rng.next_u64() % 10) as f64 / 10.0;
        whole as f64 + tenths
    }

    fn uuid(&mut self) -> String {
        let high = self.rng.next_u64();
        let low = self.rng.next_u64();
        format!(
            "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
            high >> 32,
            (high >> 16) & 0xFFFF,
            high & 0x0FFF,
            (low >> 48) | 0x8000,
            low & 0xFFFF_FFFF_FFFF,
        )
    }
}

fn position_text(location: &Value) -> Option<String> {
    let world = location.get("world")?.get("name")?.as_str()?;
    let position = location.get("position")?;
    let axis = |name: &str| position.get(name).and_then(Value::as_f64);
    Some(format!(
        "{world}  {:.0} | {:.0} | {:.0}",
        axis("x")?,
        axis("y")?,
        axis("z")?
    ))
}

fn position_view(entity: &Value, _: &RowContext<'_>) -> Cell {
    match entity.get("location").and_then(position_text) {
        Some(text) => Cell::Badge {
            text,
            tone: Tone::Info,
        },
        None => Cell::Badge {
            text: "Invalid location".to_owned(),
            tone: Tone::Error,
        },
    }
}

fn position_inputs(context: &ControlContext<'_>) -> Control {
    let controls = ["x", "y", "z"]
        .into_iter()
        .filter_map(|axis| {
            let name = FieldPath::parse(&format!("location.position.{axis}")).ok()?;
            let value = context
                .values
                .get(&name)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            Some(Control::Input {
                name,
                label: Some(axis.to_uppercase()),
                input: InputKind::Number,
                value,
                required: false,
                error: context.error,
            })
        })
        .collect();
    Control::Group {
        label: Some("Position".to_owned()),
        controls,
    }
}

pub fn world_choices(worlds: &[World]) -> Vec<Choice> {
    worlds
        .iter()
        .map(|world| Choice::new(world.uuid.clone(), world.name.clone()))
        .collect()
}

/// Jail list schema: name, world picked from `worlds`, and a grouped
/// position editor.
pub fn jail_schema(worlds: &[World]) -> Result<Schema, PathError> {
    Schema::builder()
        .field(
            "name",
            FieldSpec::new()
                .label("Name")
                .create()
                .filter()
                .required()
                .wide(),
        )
        .field(
            "world",
            FieldSpec::new()
                .label("World")
                .hidden()
                .create()
                .create_name("location.world")
                .filter()
                .filter_name("location.world.uuid")
                .options(world_choices(worlds))
                .required(),
        )
        .field(
            "position",
            FieldSpec::new()
                .label("Location")
                .group()
                .wide()
                .view(position_view)
                .create_with(position_inputs),
        )
        .build()
}

/// Jails are identified by name.
pub fn jail_identity() -> Result<ByPath, PathError> {
    Ok(ByPath::new(FieldPath::parse("name")?))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    List { force: bool },
    Create(Value),
    Change { key: EntityKey, patch: Value },
    Delete(EntityKey),
    Details(EntityKey),
}

fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}

/// In-process collaborator. Every request settles immediately by posting
/// signals on the container's channel, followed by a fresh list after a
/// successful mutation. A `location.world` written as a uuid is stored as
/// the full world object, the way listed rows carry it.
#[derive(Debug)]
pub struct MemoryBackend {
    entity_type: EntityType,
    rows: Vec<Value>,
    worlds: Vec<World>,
    signals: Sender<CrudSignal>,
    requests: Vec<Request>,
    fail_next: Option<String>,
    next_id: u64,
}

impl MemoryBackend {
    pub fn new(
        entity_type: EntityType,
        rows: Vec<Value>,
        worlds: Vec<World>,
        signals: Sender<CrudSignal>,
    ) -> Self {
        Self {
            entity_type,
            next_id: rows.len() as u64 + 1,
            rows,
            worlds,
            signals,
            requests: Vec::new(),
            fail_next: None,
        }
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// The next create, change or delete settles with `message` as its error.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    fn send(&self, signal: CrudSignal) -> Result<()> {
        if self.signals.send(signal).is_err() {
            bail!("signal receiver is gone -- the container was dropped");
        }
        Ok(())
    }

    fn send_list(&self) -> Result<()> {
        self.send(CrudSignal::ListLoaded {
            entity_type: self.entity_type.clone(),
            entities: self.rows.clone(),
            at: OffsetDateTime::now_utc(),
        })
    }

    fn settle(
        &mut self,
        operation: Operation,
        key: Option<EntityKey>,
        apply: impl FnOnce(&mut Vec<Value>) -> Result<(), String>,
    ) -> Result<()> {
        let outcome = match self.fail_next.take() {
            Some(message) => Err(message),
            None => apply(&mut self.rows),
        };
        debug!(?operation, ?key, ok = outcome.is_ok(), "memory backend settled");
        let succeeded = outcome.is_ok();
        self.send(CrudSignal::Settled {
            operation,
            key,
            outcome,
        })?;
        if succeeded {
            self.send_list()?;
        }
        Ok(())
    }

    fn resolve_world(&self, payload: &mut Value) {
        let Some(world) = payload.pointer_mut("/location/world") else {
            return;
        };
        let Some(uuid) = world.as_str() else {
            return;
        };
        if let Some(known) = self.worlds.iter().find(|known| known.uuid == uuid) {
            *world = known.to_value();
        }
    }

    fn position(rows: &[Value], identity: &dyn RowIdentity, key: &EntityKey) -> Option<usize> {
        rows.iter()
            .position(|row| identity.key(row).as_ref() == Some(key))
    }
}

impl CrudBackend for MemoryBackend {
    fn request_list(&mut self, entity_type: &EntityType, force: bool) -> Result<()> {
        self.requests.push(Request::List { force });
        if entity_type != &self.entity_type {
            return self.send(CrudSignal::ListFailed {
                entity_type: entity_type.clone(),
                message: format!("unknown entity type {entity_type}"),
            });
        }
        self.send_list()
    }

    fn request_create(
        &mut self,
        _: &EntityType,
        identity: &dyn RowIdentity,
        mut payload: Value,
    ) -> Result<()> {
        self.requests.push(Request::Create(payload.clone()));
        self.resolve_world(&mut payload);
        let mut entity = match payload {
            Value::Object(map) => Value::Object(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_owned(), other);
                Value::Object(map)
            }
        };
        if identity.key(&entity).is_none()
            && let Value::Object(map) = &mut entity
        {
            map.insert("id".to_owned(), json!(self.next_id));
            self.next_id += 1;
        }
        let key = identity.key(&entity);
        let duplicate = key
            .as_ref()
            .is_some_and(|key| Self::position(&self.rows, identity, key).is_some());
        self.settle(Operation::Create, key.clone(), |rows| {
            if duplicate {
                return Err(format!(
                    "{} already exists",
                    key.map_or_else(String::new, |key| key.to_string())
                ));
            }
            rows.push(entity);
            Ok(())
        })
    }

    fn request_change(
        &mut self,
        _: &EntityType,
        identity: &dyn RowIdentity,
        key: &EntityKey,
        mut patch: Value,
    ) -> Result<()> {
        self.requests.push(Request::Change {
            key: key.clone(),
            patch: patch.clone(),
        });
        self.resolve_world(&mut patch);
        let index = Self::position(&self.rows, identity, key);
        let missing = format!("no row with id {key}");
        self.settle(Operation::Change, Some(key.clone()), |rows| {
            let row = index
                .and_then(|index| rows.get_mut(index))
                .ok_or(missing)?;
            merge(row, patch);
            Ok(())
        })
    }

    fn request_delete(
        &mut self,
        _: &EntityType,
        identity: &dyn RowIdentity,
        key: &EntityKey,
    ) -> Result<()> {
        self.requests.push(Request::Delete(key.clone()));
        let index = Self::position(&self.rows, identity, key);
        let missing = format!("no row with id {key}");
        self.settle(Operation::Delete, Some(key.clone()), |rows| {
            let index = index.ok_or(missing)?;
            rows.remove(index);
            Ok(())
        })
    }

    fn request_details(&mut self, _: &EntityType, key: &EntityKey) -> Result<()> {
        self.requests.push(Request::Details(key.clone()));
        Ok(())
    }
}
