//! Item fusion: the boundary to the external generator that turns two
//! items into a new one.
//!
//! A [`FusionService`] answers one request synchronously. The engine never
//! calls it directly; requests go through a [`FusionWorker`], which either
//! runs a remote-backed service on its own thread or evaluates a local
//! service in place and hands the result back on the next poll.

use std::collections::VecDeque;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use serde_json::Value;
use thiserror::Error;

use survivors_core::enums::Rarity;
use survivors_core::items::{Item, ItemId};
use survivors_core::stats::StatEffects;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    #[error("fusion service failed: {0}")]
    Service(String),

    #[error("malformed fusion response: {0}")]
    MalformedResponse(String),

    #[error("fusion response is missing `{0}`")]
    MissingField(&'static str),
}

/// What a fusion service hands back: everything but the identity fields,
/// which the caller assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDescriptor {
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub effects: StatEffects,
}

impl ItemDescriptor {
    /// Turn the descriptor into a generated item with parents `a` and `b`.
    pub fn into_item(self, a: &str, b: &str, stamp: u64) -> Item {
        Item {
            id: format!("generated_{a}_{b}_{stamp}"),
            name: self.name,
            description: self.description,
            rarity: self.rarity,
            effects: self.effects,
            is_starting_item: false,
            parents: Some((a.to_string(), b.to_string())),
        }
    }
}

pub trait FusionService: Send {
    fn fuse(&self, first: &Item, second: &Item) -> Result<ItemDescriptor, FusionError>;
}

/// A text-completion backend, e.g. a chat-completions HTTP client.
pub trait CompletionClient: Send {
    fn complete(&self, prompt: &str) -> Result<String, FusionError>;
}

/// Completion through an external program: the prompt is written to its
/// stdin and its stdout is the response. A small script can front any
/// hosted chat-completions API this way.
pub struct CommandClient {
    program: String,
    args: Vec<String>,
}

impl CommandClient {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl CompletionClient for CommandClient {
    fn complete(&self, prompt: &str) -> Result<String, FusionError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| FusionError::Service(format!("cannot start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .map_err(|e| FusionError::Service(format!("cannot write prompt: {e}")))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|e| FusionError::Service(format!("{} did not finish: {e}", self.program)))?;
        if !output.status.success() {
            return Err(FusionError::Service(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| FusionError::MalformedResponse(e.to_string()))
    }
}

/// Fusion through a language model: prompt, complete, parse.
pub struct LlmFusion<C> {
    client: C,
}

impl<C: CompletionClient> LlmFusion<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: CompletionClient> FusionService for LlmFusion<C> {
    fn fuse(&self, first: &Item, second: &Item) -> Result<ItemDescriptor, FusionError> {
        let prompt = build_prompt(first, second);
        let response = self.client.complete(&prompt)?;
        parse_response(&response)
    }
}

fn describe_effects(effects: &StatEffects) -> String {
    let non_zero: serde_json::Map<String, Value> = effects
        .non_zero()
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::from(value)))
        .collect();
    serde_json::to_string_pretty(&non_zero).unwrap_or_else(|_| "{}".to_string())
}

fn describe_parent(label: &str, item: &Item) -> String {
    format!(
        "{label}:\nName: {}\nDescription: {}\nRarity: {}\nEffects: {}\n",
        item.name,
        item.description,
        item.rarity.as_str(),
        describe_effects(&item.effects)
    )
}

/// The generation prompt for fusing `first` and `second`.
pub fn build_prompt(first: &Item, second: &Item) -> String {
    let mut prompt = String::from(
        "You design passive items for a survivors-style roguelike. \
         Two items are being fused into one new item.\n\n",
    );
    prompt.push_str(&describe_parent("First item", first));
    prompt.push('\n');
    prompt.push_str(&describe_parent("Second item", second));
    prompt.push_str(
        "\nThe new item must:\n\
         - have a name that draws on both parents\n\
         - have a short description of at most 15 words\n\
         - fuse the parents' effects, with a stat total close to their sum\n\
         - have the rarity of the rarest parent, or one tier above it\n\n\
         Rarity tiers: common < uncommon < rare < epic < legendary\n\n\
         Reply with a single JSON object and nothing else:\n",
    );
    let example = serde_json::json!({
        "name": "New Item Name",
        "description": "Item description",
        "rarity": "uncommon",
        "effects": StatEffects::default(),
    });
    prompt.push_str(&serde_json::to_string_pretty(&example).unwrap_or_default());
    prompt
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .trim()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn required_text(object: &serde_json::Map<String, Value>, field: &'static str) -> Result<String, FusionError> {
    match object.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(FusionError::MissingField(field)),
    }
}

/// Parse a generator response into a descriptor.
///
/// Markdown code fences are ignored. `name`, `description`, `rarity` and
/// `effects` are required; missing effect fields read as zero. An
/// unrecognized rarity is accepted as common.
pub fn parse_response(text: &str) -> Result<ItemDescriptor, FusionError> {
    let value: Value = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| FusionError::MalformedResponse(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| FusionError::MalformedResponse("expected a JSON object".to_string()))?;

    let name = required_text(object, "name")?;
    let description = required_text(object, "description")?;
    let rarity_text = required_text(object, "rarity")?;
    let rarity = Rarity::parse(&rarity_text).unwrap_or_else(|| {
        log::warn!("unknown rarity {rarity_text:?} in fusion response, using common");
        Rarity::Common
    });

    let effects = match object.get("effects") {
        Some(effects @ Value::Object(_)) => serde_json::from_value(effects.clone())
            .map_err(|e| FusionError::MalformedResponse(e.to_string()))?,
        _ => return Err(FusionError::MissingField("effects")),
    };

    Ok(ItemDescriptor {
        name,
        description,
        rarity,
        effects,
    })
}

/// Local fusion without a model: effects are summed, and the rarity is the
/// rarest parent's, one tier higher when both parents share a tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFusion;

impl FusionService for OfflineFusion {
    fn fuse(&self, first: &Item, second: &Item) -> Result<ItemDescriptor, FusionError> {
        let rarity = if first.rarity == second.rarity {
            first.rarity.upgraded()
        } else {
            first.rarity.max(second.rarity)
        };
        let name = if first.id == second.id {
            format!("Greater {}", first.name)
        } else {
            format!("{} {}", first.name, second.name)
        };
        Ok(ItemDescriptor {
            name,
            description: format!("{} fused with {}", first.name, second.name),
            rarity,
            effects: first.effects.combined(&second.effects),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FusionJob {
    /// Caller-chosen tag, echoed back on the outcome.
    pub ticket: u64,
    pub first: Item,
    pub second: Item,
}

#[derive(Debug, Clone)]
pub struct FusionOutcome {
    pub ticket: u64,
    pub first_id: ItemId,
    pub second_id: ItemId,
    pub result: Result<ItemDescriptor, FusionError>,
}

impl FusionJob {
    fn run(self, service: &dyn FusionService) -> FusionOutcome {
        let result = service.fuse(&self.first, &self.second);
        FusionOutcome {
            ticket: self.ticket,
            first_id: self.first.id,
            second_id: self.second.id,
            result,
        }
    }
}

enum Backend {
    Threaded {
        jobs: mpsc::Sender<FusionJob>,
        results: mpsc::Receiver<FusionOutcome>,
    },
    Inline(Box<dyn FusionService>),
}

/// Non-blocking front end to a fusion service.
pub struct FusionWorker {
    backend: Backend,
    ready: VecDeque<FusionOutcome>,
}

impl FusionWorker {
    /// Run `service` on a dedicated thread. The thread exits when the
    /// worker is dropped.
    pub fn spawn(service: Box<dyn FusionService>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<FusionJob>();
        let (result_tx, result_rx) = mpsc::channel();

        thread::spawn(move || {
            for job in job_rx {
                log::debug!("fusing {} + {}", job.first.id, job.second.id);
                if result_tx.send(job.run(service.as_ref())).is_err() {
                    break;
                }
            }
        });

        Self {
            backend: Backend::Threaded {
                jobs: job_tx,
                results: result_rx,
            },
            ready: VecDeque::new(),
        }
    }

    /// Evaluate `service` on submit and deliver on the next poll. Meant for
    /// services that never wait on I/O, such as [`OfflineFusion`].
    pub fn inline(service: Box<dyn FusionService>) -> Self {
        Self {
            backend: Backend::Inline(service),
            ready: VecDeque::new(),
        }
    }

    pub fn submit(&mut self, job: FusionJob) {
        match &self.backend {
            Backend::Threaded { jobs, .. } => {
                if let Err(mpsc::SendError(job)) = jobs.send(job) {
                    self.ready.push_back(FusionOutcome {
                        ticket: job.ticket,
                        first_id: job.first.id,
                        second_id: job.second.id,
                        result: Err(FusionError::Service("fusion worker stopped".to_string())),
                    });
                }
            }
            Backend::Inline(service) => {
                let outcome = job.run(service.as_ref());
                self.ready.push_back(outcome);
            }
        }
    }

    /// A finished outcome, if any. Never blocks.
    pub fn try_recv(&mut self) -> Option<FusionOutcome> {
        if let Some(outcome) = self.ready.pop_front() {
            return Some(outcome);
        }
        match &self.backend {
            Backend::Threaded { results, .. } => match results.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(mpsc::TryRecvError::Empty) => None,
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::warn!("fusion worker thread is gone");
                    None
                }
            },
            Backend::Inline(_) => None,
        }
    }
}

impl Default for FusionWorker {
    fn default() -> Self {
        Self::inline(Box::new(OfflineFusion))
    }
}
