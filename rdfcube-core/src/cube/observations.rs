use oxrdf::NamedNode;

use super::CubeIris;
use super::prepare::PreparedData;
use crate::rdf::Graph;
use crate::rdf::vocab::{CUBE, rdf_type, term};

/// Writes the observation set followed by one subject per observation.
pub(super) fn write(
    graph: &mut Graph,
    prepared: &PreparedData,
    iris: &CubeIris,
    observer: &NamedNode,
) {
    let a = rdf_type();
    let set = &iris.observation_set;
    graph.add(set, &a, term(CUBE, "ObservationSet"));
    let observation_predicate = term(CUBE, "observation");
    for observation in &prepared.observations {
        graph.add(set, &observation_predicate, observation.clone());
    }

    let observation_class = term(CUBE, "Observation");
    let observed_by = term(CUBE, "observedBy");
    for (row, observation) in prepared.observations.iter().enumerate() {
        graph.add(observation, &a, observation_class.clone());
        graph.add(observation, &observed_by, observer.clone());
        for column in &prepared.columns {
            if let Some(value) = column.values.get(row) {
                graph.add(observation, &column.property, value.clone());
            }
        }
    }
}
