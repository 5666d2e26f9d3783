use super::controller::{AvatarController, AvatarMixer, CharacterRoot};
use crate::app::state::AppState;
use crate::settings::SettingsResource;
use avatar::{ClipProvider, ClipSet, Mixer, StateKind};
use bevy::gltf::Gltf;
use bevy::prelude::*;

/// Animation graph built from the avatar glTF, one node per state.
#[derive(Resource)]
pub struct AvatarAnimationLibrary {
    pub gltf_handle: Handle<Gltf>,
    pub graph_handle: Option<Handle<AnimationGraph>>,
    pub nodes: Option<ClipSet<AnimationNodeIndex>>,
    pub durations: Option<ClipSet<f32>>,
    pub initialized: bool,
}

impl AvatarAnimationLibrary {
    pub fn new(gltf_handle: Handle<Gltf>) -> Self {
        Self {
            gltf_handle,
            graph_handle: None,
            nodes: None,
            durations: None,
            initialized: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.nodes.is_some() && self.durations.is_some()
    }
}

/// Build the animation graph once the glTF and its clips are loaded.
pub fn initialize_avatar_animation_library(
    mut library: ResMut<AvatarAnimationLibrary>,
    settings: Res<SettingsResource>,
    gltfs: Res<Assets<Gltf>>,
    clips: Res<Assets<AnimationClip>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    if library.initialized {
        return;
    }

    let Some(gltf) = gltfs.get(&library.gltf_handle) else {
        return;
    };

    let names = &settings.current.avatar.clips;
    let lookup =
        ClipSet::from_fn(|kind| gltf.named_animations.get(names.name_for(kind)).cloned());
    let missing: Vec<&str> = lookup
        .iter()
        .filter(|(_, handle)| handle.is_none())
        .map(|(kind, _)| names.name_for(kind))
        .collect();
    let Some(handles) = lookup.transpose() else {
        library.initialized = true;
        warn!(
            "Avatar model has no animation named {:?}; the avatar stays unanimated.",
            missing
        );
        return;
    };

    // Clip sub-assets can trail the glTF by a frame.
    let Some(durations) = ClipSet::from_fn(|kind| {
        clips
            .get(&handles[kind])
            .map(AnimationClip::duration)
    })
    .transpose() else {
        return;
    };

    let mut graph = AnimationGraph::new();
    let root = graph.root;
    let nodes = ClipSet::from_fn(|kind| graph.add_clip(handles[kind].clone(), 1.0, root));

    for (kind, duration) in durations.iter() {
        info!("Avatar clip '{}' bound to {} ({:.2}s)", names.name_for(kind), kind, duration);
    }

    library.initialized = true;
    library.graph_handle = Some(graphs.add(graph));
    library.nodes = Some(nodes);
    library.durations = Some(durations);
}

/// Marker for animation players already driven by the avatar mixer.
#[derive(Component)]
pub struct AvatarAnimationBound;

/// Attach the shared graph to animation players spawned under the avatar.
pub fn bind_avatar_animation_players(
    mut commands: Commands,
    library: Res<AvatarAnimationLibrary>,
    roots: Query<Entity, With<CharacterRoot>>,
    children_query: Query<&Children>,
    players: Query<Entity, (With<AnimationPlayer>, Without<AvatarAnimationBound>)>,
) {
    let Some(graph_handle) = library.graph_handle.clone() else {
        return;
    };

    for root in &roots {
        for entity in find_in_subtree(root, &children_query, |entity| players.contains(entity)) {
            commands.entity(entity).insert((
                AnimationGraphHandle(graph_handle.clone()),
                AvatarAnimationBound,
            ));
        }
    }
}

/// Hand the controller its clips once a player is bound, then start running.
pub fn signal_clips_ready(
    mut commands: Commands,
    library: Res<AvatarAnimationLibrary>,
    mut avatars: Query<(Entity, &mut AvatarController), (With<CharacterRoot>, Without<AvatarMixer>)>,
    children_query: Query<&Children>,
    bound: Query<(), With<AvatarAnimationBound>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(durations) = library.durations.clone() else {
        return;
    };

    for (entity, mut controller) in &mut avatars {
        let has_player =
            !find_in_subtree(entity, &children_query, |child| bound.contains(child)).is_empty();
        if !has_player {
            continue;
        }

        let mut mixer = Mixer::new(durations.clone());
        controller.on_clips_ready(&mut mixer);
        commands.entity(entity).insert(AvatarMixer(mixer));
        next_state.set(AppState::Running);
    }
}

/// Mirror every mixer clip's weight and time onto the bound animation players.
pub fn sync_animation_players(
    library: Res<AvatarAnimationLibrary>,
    avatars: Query<(Entity, &AvatarMixer), With<CharacterRoot>>,
    children_query: Query<&Children>,
    mut players: Query<&mut AnimationPlayer, With<AvatarAnimationBound>>,
) {
    let Some(nodes) = library.nodes.as_ref() else {
        return;
    };

    for (root, mixer) in &avatars {
        for entity in find_in_subtree(root, &children_query, |entity| players.contains(entity)) {
            let Ok(mut player) = players.get_mut(entity) else {
                continue;
            };
            for (kind, &node) in nodes.iter() {
                mirror_clip(&mut player, node, &mixer.0, kind);
            }
        }
    }
}

fn mirror_clip(player: &mut AnimationPlayer, node: AnimationNodeIndex, mixer: &Mixer, kind: StateKind) {
    let action = mixer.clip(kind);
    let weight = if action.is_running() {
        action.effective_weight()
    } else {
        0.0
    };

    if weight <= 0.0 {
        if player.is_playing_animation(node) {
            player.stop(node);
        }
        return;
    }

    // The mixer owns the clock; the player only samples.
    player
        .play(node)
        .set_weight(weight)
        .seek_to(action.sample_time())
        .pause();
}

fn find_in_subtree(
    root: Entity,
    children_query: &Query<&Children>,
    mut matches: impl FnMut(Entity) -> bool,
) -> Vec<Entity> {
    let mut result = Vec::new();
    let mut queue = vec![root];
    while let Some(entity) = queue.pop() {
        if matches(entity) {
            result.push(entity);
        }
        if let Ok(children) = children_query.get(entity) {
            queue.extend(children.iter());
        }
    }
    result
}
