//! Contract between the frame loop and whatever draws the frame

use crate::config::VisualizerConfig;
use crate::state::FrameState;

#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    FloatArray(Vec<f32>),
    Vec2Array(Vec<[f32; 2]>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Uniform {
    pub name: &'static str,
    pub value: UniformValue,
}

/// Named shader inputs for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformSet {
    uniforms: Vec<Uniform>,
}

impl UniformSet {
    pub fn push(&mut self, name: &'static str, value: UniformValue) {
        self.uniforms.push(Uniform { name, value });
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .map(|u| &u.value)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(UniformValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uniform> {
        self.uniforms.iter()
    }

    pub fn len(&self) -> usize {
        self.uniforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty()
    }

    /// Maps a frame state onto the uniform names the shaders use.
    pub fn from_frame(state: &FrameState, config: &VisualizerConfig, resolution: [f32; 2]) -> Self {
        let base_color = config
            .color_palette
            .get(state.color_index % config.color_palette.len().max(1))
            .copied()
            .unwrap_or([1.0, 1.0, 1.0]);

        let mut set = Self::default();
        set.push("u_resolution", UniformValue::Vec2(resolution));
        set.push("u_time", UniformValue::Float(state.current_time as f32));
        set.push("u_amplitude", UniformValue::Float(state.current_amplitude));
        set.push(
            "u_smooth_amplitude",
            UniformValue::Float(state.smoothed_amplitude),
        );
        set.push("u_bass", UniformValue::Float(state.bass_energy));
        set.push("u_mid", UniformValue::Float(state.mid_energy));
        set.push("u_treble", UniformValue::Float(state.treble_energy));
        set.push("u_base_color", UniformValue::Vec3(base_color));
        set.push(
            "u_pattern_index",
            UniformValue::Int(state.pattern_index as i32),
        );
        set.push(
            "u_prev_pattern_index",
            UniformValue::Int(state.prev_pattern_index as i32),
        );
        set.push(
            "u_transition_progress",
            UniformValue::Float(state.transition_progress(config.pattern_transition_time)),
        );
        set.push("u_beat_intensity", UniformValue::Float(state.beat_intensity));
        set.push(
            "u_drops_pos",
            UniformValue::Vec2Array(state.drop_positions.clone()),
        );
        set.push(
            "u_drops_time",
            UniformValue::FloatArray(state.drop_times.clone()),
        );
        set.push(
            "u_bloom_intensity",
            UniformValue::Float(config.bloom_intensity),
        );
        set.push(
            "u_vignette_intensity",
            UniformValue::Float(config.vignette_intensity),
        );
        set.push("u_contrast", UniformValue::Float(config.contrast));
        set.push("u_saturation", UniformValue::Float(config.saturation));
        set
    }
}

/// Draws a frame from a read-only state snapshot.
pub trait Renderer {
    fn render(&mut self, state: &FrameState, uniforms: &UniformSet);

    /// Output size handed to the shaders as `u_resolution`.
    fn resolution(&self) -> [f32; 2] {
        [1920.0, 1080.0]
    }
}
