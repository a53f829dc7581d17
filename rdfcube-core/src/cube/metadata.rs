use oxrdf::NamedNode;
use oxrdf::vocab::xsd;

use super::{CubeIris, language_text, named};
use crate::description::{AccrualPeriodicity, Agent, CubeDescription, LangMap, WorkStatus};
use crate::error::Result;
use crate::rdf::vocab::{
    CUBE, DCAT, DCT, FREQ, SCHEMA, VISUALIZE_APPLICATION, WORK_STATUS, rdf_type, term,
};
use crate::rdf::{Graph, Node};

pub(super) fn write(graph: &mut Graph, description: &CubeDescription, iris: &CubeIris) -> Result<()> {
    let cube = &iris.cube;
    let a = rdf_type();
    for class in [term(CUBE, "Cube"), term(SCHEMA, "Dataset"), term(DCAT, "Dataset")] {
        graph.add(cube, &a, class);
    }

    add_lang_map(graph, cube, &term(SCHEMA, "name"), &description.name)?;
    add_lang_map(graph, cube, &term(SCHEMA, "description"), &description.description)?;
    add_agents(graph, cube, &term(SCHEMA, "publisher"), &description.publisher)?;
    add_agents(graph, cube, &term(SCHEMA, "creator"), &description.creator)?;
    add_agents(graph, cube, &term(SCHEMA, "contributor"), &description.contributor)?;

    let created = description.creation_date()?;
    graph.add(
        cube,
        &term(SCHEMA, "dateCreated"),
        Node::typed(created.format("%Y-%m-%d").to_string(), xsd::DATE),
    );

    if let Some(contact) = &description.contact_point {
        graph.add(
            cube,
            &term(SCHEMA, "contactPoint"),
            Node::Blank(vec![
                (term(SCHEMA, "email"), Node::string(contact.email.clone())),
                (term(SCHEMA, "name"), Node::string(contact.name.clone())),
            ]),
        );
    }

    graph.add(
        cube,
        &term(SCHEMA, "version"),
        Node::integer(i64::from(description.version)),
    );
    graph.add(
        cube,
        &term(SCHEMA, "identifier"),
        Node::string(description.identifier.trim()),
    );
    let status = match description.work_status {
        WorkStatus::Draft => "Draft",
        WorkStatus::Published => "Published",
    };
    graph.add(
        cube,
        &term(SCHEMA, "creativeWorkStatus"),
        term(WORK_STATUS, status),
    );
    if description.visualize {
        graph.add(
            cube,
            &term(SCHEMA, "workExample"),
            NamedNode::new_unchecked(VISUALIZE_APPLICATION),
        );
    }
    if let Some(periodicity) = description.accrual_periodicity {
        graph.add(
            cube,
            &term(DCT, "accrualPeriodicity"),
            term(FREQ, frequency(periodicity)),
        );
    }

    graph.add(
        cube,
        &term(CUBE, "observationSet"),
        iris.observation_set.clone(),
    );
    graph.add(
        cube,
        &term(CUBE, "observationConstraint"),
        iris.shape.clone(),
    );
    Ok(())
}

fn add_lang_map(
    graph: &mut Graph,
    subject: &NamedNode,
    predicate: &NamedNode,
    texts: &LangMap,
) -> Result<()> {
    for (language, text) in texts {
        if !text.trim().is_empty() {
            graph.add(subject, predicate, language_text(text, language)?);
        }
    }
    Ok(())
}

fn add_agents(
    graph: &mut Graph,
    cube: &NamedNode,
    predicate: &NamedNode,
    agents: &[Agent],
) -> Result<()> {
    for agent in agents {
        let iri = named(agent.iri.clone())?;
        graph.add(cube, predicate, iri.clone());
        if let Some(name) = &agent.name {
            graph.add(&iri, &term(SCHEMA, "name"), Node::string(name.clone()));
        }
    }
    Ok(())
}

const fn frequency(periodicity: AccrualPeriodicity) -> &'static str {
    match periodicity {
        AccrualPeriodicity::Daily => "DAILY",
        AccrualPeriodicity::Weekly => "WEEKLY",
        AccrualPeriodicity::Monthly => "MONTHLY",
        AccrualPeriodicity::Quarterly => "QUARTERLY",
        AccrualPeriodicity::Yearly => "ANNUAL",
        AccrualPeriodicity::Biennial => "BIENNIAL",
        AccrualPeriodicity::Irregular => "IRREG",
        AccrualPeriodicity::Continuous => "CONT",
    }
}
