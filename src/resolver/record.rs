use serde::Deserialize;

use crate::core::artifact::Artifact;
use crate::core::node::NodeResolution;
use crate::graph::GraphError;

const TREE_INCLUDED: i32 = 0;
const TREE_OMITTED_FOR_DUPLICATE: i32 = 1;
const TREE_OMITTED_FOR_CONFLICT: i32 = 2;
const TREE_OMITTED_FOR_CYCLE: i32 = 3;

/// One record of a resolver's output tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedRecord {
    #[serde(default)]
    pub artifact: Option<Artifact>,
    #[serde(flatten)]
    pub shape: RecordShape,
    #[serde(default)]
    pub children: Vec<ResolvedRecord>,
}

// Resolver trees can be arbitrarily deep; unlink children iteratively so
// dropping a record never recurses.
impl Drop for ResolvedRecord {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut record) = pending.pop() {
            pending.append(&mut record.children);
        }
    }
}

/// The three record layouts resolvers hand out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum RecordShape {
    /// Plain resolved graph. Every record is part of the resolution.
    Graph,
    /// Verbose tree carrying an integer state and the related (winning) version.
    Tree {
        state: i32,
        #[serde(default, rename = "relatedVersion")]
        related_version: Option<String>,
    },
    /// Conflict-marked graph: a winner is present on every losing record.
    Conflict {
        #[serde(default)]
        winner: Option<String>,
        #[serde(default)]
        cyclic: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub resolution: NodeResolution,
    pub effective_version: String,
}

pub fn classify(artifact: &Artifact, shape: &RecordShape) -> Result<Classification, GraphError> {
    let own = || artifact.version.clone();
    let classification = match shape {
        RecordShape::Graph => Classification {
            resolution: NodeResolution::Included,
            effective_version: own(),
        },
        RecordShape::Tree {
            state,
            related_version,
        } => {
            let resolution = match *state {
                TREE_INCLUDED => NodeResolution::Included,
                TREE_OMITTED_FOR_DUPLICATE => NodeResolution::OmittedForDuplicate,
                TREE_OMITTED_FOR_CONFLICT => NodeResolution::OmittedForConflict,
                TREE_OMITTED_FOR_CYCLE => NodeResolution::OmittedForCycle,
                other => return Err(GraphError::UnknownNodeState(other)),
            };
            let effective_version = match resolution {
                NodeResolution::OmittedForConflict => related_version.clone().unwrap_or_else(own),
                _ => own(),
            };
            Classification {
                resolution,
                effective_version,
            }
        }
        RecordShape::Conflict { winner, cyclic } => match (winner, cyclic) {
            (_, true) => Classification {
                resolution: NodeResolution::OmittedForCycle,
                effective_version: own(),
            },
            (Some(winner), false) if *winner == artifact.version => Classification {
                resolution: NodeResolution::OmittedForDuplicate,
                effective_version: own(),
            },
            (Some(winner), false) => Classification {
                resolution: NodeResolution::OmittedForConflict,
                effective_version: winner.clone(),
            },
            (None, false) => Classification {
                resolution: NodeResolution::Included,
                effective_version: own(),
            },
        },
    };
    Ok(classification)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> Artifact {
        Artifact::new("g", "a", "1.0")
    }

    #[test]
    fn tree_states_map_to_resolutions() {
        let cases = [
            (0, NodeResolution::Included),
            (1, NodeResolution::OmittedForDuplicate),
            (2, NodeResolution::OmittedForConflict),
            (3, NodeResolution::OmittedForCycle),
        ];
        for (state, expected) in cases {
            let shape = RecordShape::Tree {
                state,
                related_version: None,
            };
            let classification = classify(&artifact(), &shape).expect("classify");
            assert_eq!(classification.resolution, expected, "state {state}");
        }
    }

    #[test]
    fn unknown_tree_state_is_rejected() {
        let shape = RecordShape::Tree {
            state: 7,
            related_version: None,
        };
        let err = classify(&artifact(), &shape).expect_err("unknown state");
        assert!(matches!(err, GraphError::UnknownNodeState(7)));
    }

    #[test]
    fn conflict_winner_with_same_version_is_duplicate() {
        let shape = RecordShape::Conflict {
            winner: Some("1.0".to_string()),
            cyclic: false,
        };
        let classification = classify(&artifact(), &shape).expect("classify");
        assert_eq!(
            classification.resolution,
            NodeResolution::OmittedForDuplicate
        );
    }

    #[test]
    fn conflict_winner_with_other_version_is_conflict() {
        let shape = RecordShape::Conflict {
            winner: Some("2.0".to_string()),
            cyclic: false,
        };
        let classification = classify(&artifact(), &shape).expect("classify");
        assert_eq!(classification.resolution, NodeResolution::OmittedForConflict);
        assert_eq!(classification.effective_version, "2.0");
    }

    #[test]
    fn cyclic_conflict_record_is_cycle() {
        let shape = RecordShape::Conflict {
            winner: Some("2.0".to_string()),
            cyclic: true,
        };
        let classification = classify(&artifact(), &shape).expect("classify");
        assert_eq!(classification.resolution, NodeResolution::OmittedForCycle);
    }

    #[test]
    fn record_deserializes_from_json() {
        let json = r#"{
            "shape": "tree",
            "state": 2,
            "relatedVersion": "2.0",
            "artifact": {"groupId": "g", "artifactId": "a", "version": "1.0", "scope": "test"},
            "children": [
                {"shape": "graph", "artifact": {"groupId": "g", "artifactId": "b", "version": "1.1"}}
            ]
        }"#;
        let record: ResolvedRecord = serde_json::from_str(json).expect("parse record");
        assert_eq!(
            record.shape,
            RecordShape::Tree {
                state: 2,
                related_version: Some("2.0".to_string())
            }
        );
        let artifact = record.artifact.as_ref().expect("artifact");
        assert_eq!(artifact.scope.as_deref(), Some("test"));
        assert_eq!(artifact.type_, "jar");
        assert_eq!(record.children.len(), 1);
        assert_eq!(record.children[0].shape, RecordShape::Graph);
    }
}
