use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Regex-based survey of a `.pro` script corpus.
///
/// Works on raw source text rather than parse results, so scripts that the
/// parser rejects still contribute to the counts.
#[derive(Debug)]
pub struct ScriptSurvey {
    pub scenes: HashSet<String>,
    pub clips: HashSet<String>,
    pub characters: HashSet<String>,
    pub jump_targets: HashSet<String>,
    pub variables: HashSet<String>,
    pub files: usize,
}

impl ScriptSurvey {
    pub fn new() -> Self {
        Self {
            scenes: HashSet::new(),
            clips: HashSet::new(),
            characters: HashSet::new(),
            jump_targets: HashSet::new(),
            variables: HashSet::new(),
            files: 0,
        }
    }

    pub fn survey_directory(&mut self, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if !dir.is_dir() {
            return Err(format!("Scripts directory not found: {}", dir.display()).into());
        }
        self.walk_directory(dir)?;
        Ok(())
    }

    fn walk_directory(&mut self, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let entries = fs::read_dir(dir)?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                self.walk_directory(&path)?;
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("pro") {
                if let Ok(contents) = fs::read_to_string(&path) {
                    self.files += 1;
                    self.survey_script(&contents);
                }
            }
        }
        Ok(())
    }

    fn survey_script(&mut self, contents: &str) {
        let scene_pattern = Regex::new(r"(?im)^\s*scene\s*:\s*([^\s\[\]]+)").unwrap();
        let clip_pattern = Regex::new(r"(?im)^\s*clip\s*:\s*([^\s\[\]]+)").unwrap();
        let direction_pattern =
            Regex::new(r"(?im)^\s*([^\s\[\]:]+)\s+(looks|enters|moves|turns)\b").unwrap();
        let jump_pattern = Regex::new(r"(?i)\bjump\s+([^\s\[\]]+)").unwrap();
        let set_pattern = Regex::new(r"(?i)\[\s*set\s+([^\s\[\]]+)").unwrap();

        for cap in scene_pattern.captures_iter(contents) {
            if let Some(name) = cap.get(1) {
                self.scenes.insert(name.as_str().to_lowercase());
            }
        }

        for cap in clip_pattern.captures_iter(contents) {
            if let Some(name) = cap.get(1) {
                self.clips.insert(name.as_str().to_lowercase());
            }
        }

        for cap in direction_pattern.captures_iter(contents) {
            if let Some(name) = cap.get(1) {
                self.characters.insert(name.as_str().to_lowercase());
            }
        }

        for cap in jump_pattern.captures_iter(contents) {
            if let Some(target) = cap.get(1) {
                self.jump_targets.insert(target.as_str().to_lowercase());
            }
        }

        for cap in set_pattern.captures_iter(contents) {
            if let Some(name) = cap.get(1) {
                self.variables.insert(name.as_str().to_lowercase());
            }
        }
    }

    /// Jump targets that name no known scene or clip.
    pub fn dangling_jumps(&self) -> Vec<&String> {
        let mut dangling: Vec<&String> = self
            .jump_targets
            .iter()
            .filter(|t| !self.scenes.contains(*t) && !self.clips.contains(*t))
            .collect();
        dangling.sort();
        dangling
    }

    pub fn print_survey(&self) {
        println!("\n=== Prospero Script Survey ===\n");
        println!("Files surveyed: {}", self.files);

        println!("\nScenes found ({})", self.scenes.len());
        for scene in &self.scenes {
            println!("  - {}", scene);
        }

        println!("\nClips found ({})", self.clips.len());
        for clip in &self.clips {
            println!("  - {}", clip);
        }

        println!("\nCharacters found ({})", self.characters.len());
        for character in &self.characters {
            println!("  - {}", character);
        }

        println!("\nVariables found ({})", self.variables.len());
        for variable in &self.variables {
            println!("  - {}", variable);
        }

        let dangling = self.dangling_jumps();
        println!("\nJump targets found ({})", self.jump_targets.len());
        for target in &self.jump_targets {
            println!("  - {}", target);
        }
        if !dangling.is_empty() {
            println!("\nJump targets with no matching scene or clip ({})", dangling.len());
            for target in dangling {
                println!("  - {}", target);
            }
        }
    }
}

impl Default for ScriptSurvey {
    fn default() -> Self {
        Self::new()
    }
}
