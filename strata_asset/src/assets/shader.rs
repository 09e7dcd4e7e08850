#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    /// Fixed order in which stage sources are concatenated.
    pub const ORDER: [ShaderStage; 3] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: Option<String>,
    pub fragment: Option<String>,
    pub compute: Option<String>,
}

impl ShaderSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: ShaderStage, source: impl Into<String>) -> Self {
        *self.stage_mut(stage) = Some(source.into());
        self
    }

    pub fn stage(&self, stage: ShaderStage) -> Option<&str> {
        match stage {
            ShaderStage::Vertex => self.vertex.as_deref(),
            ShaderStage::Fragment => self.fragment.as_deref(),
            ShaderStage::Compute => self.compute.as_deref(),
        }
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut Option<String> {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
            ShaderStage::Compute => &mut self.compute,
        }
    }

    /// Present stages in [`ShaderStage::ORDER`].
    pub fn stages(&self) -> impl Iterator<Item = (ShaderStage, &str)> {
        ShaderStage::ORDER
            .into_iter()
            .filter_map(|stage| self.stage(stage).map(|code| (stage, code)))
    }

    pub fn combined(&self) -> String {
        self.stages().map(|(_, code)| code).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages().next().is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ShaderAsset {
    pub name: String,
    pub sources: ShaderSources,
}

impl ShaderAsset {
    pub fn new(name: impl Into<String>, sources: ShaderSources) -> Self {
        ShaderAsset {
            name: name.into(),
            sources,
        }
    }
}
