//! Static catalog data served to the marketing site and dashboards.
//!
//! Built once on first access and never mutated.

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::models::{
    CompanyDonation, CompanyStats, ImpactMetrics, MediaAttachment, MediaKind, Milestone, Project,
    ProjectLocation, Update,
};

/// Categories offered by the filter panel.
pub const CATEGORIES: [&str; 6] = [
    "Educación y Alimentación",
    "Educación y Tecnología",
    "Medio Ambiente",
    "Salud",
    "Infraestructura",
    "Desarrollo Comunitario",
];

/// Provinces offered by the filter panel.
pub const PROVINCES: [&str; 7] = [
    "Buenos Aires",
    "Córdoba",
    "Salta",
    "Mendoza",
    "Santa Fe",
    "Tucumán",
    "Entre Ríos",
];

pub static PROJECTS: Lazy<Vec<Project>> = Lazy::new(|| {
    vec![
        comedor_san_martin(),
        biblioteca_quilmes(),
        huerta_urbana(),
    ]
});

pub static COMPANY_STATS: Lazy<CompanyStats> = Lazy::new(|| CompanyStats {
    total_donated: 45_600,
    projects_supported: 8,
    // 30% of the total donated
    tax_deductions: 13_680,
    impact_metrics: ImpactMetrics {
        people_helped: 1_250,
        communities_reached: 12,
        sdg_goals: vec![
            "Educación de Calidad".to_string(),
            "Fin de la Pobreza".to_string(),
            "Acción por el Clima".to_string(),
        ],
    },
});

pub static COMPANY_DONATIONS: Lazy<Vec<CompanyDonation>> = Lazy::new(|| {
    vec![
        company_donation("d1", "1", 15_000, date(2025, 6, 1)),
        company_donation("d2", "2", 12_000, date(2025, 5, 15)),
        company_donation("d3", "3", 8_500, date(2025, 4, 20)),
    ]
});

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("fixture dates are valid calendar dates")
}

fn company_donation(id: &str, project_id: &str, amount: u64, date: NaiveDate) -> CompanyDonation {
    CompanyDonation {
        id: id.to_string(),
        project_id: project_id.to_string(),
        amount,
        date,
        tax_deductible: true,
    }
}

fn milestone(
    id: &str,
    title: &str,
    description: &str,
    (target_amount, current_amount): (u64, u64),
    completed_date: Option<NaiveDate>,
    percentage: u8,
) -> Milestone {
    Milestone {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        target_amount,
        current_amount,
        completed: completed_date.is_some(),
        completed_date,
        percentage,
    }
}

fn photo(id: &str, url: &str, caption: &str) -> MediaAttachment {
    MediaAttachment {
        id: id.to_string(),
        kind: MediaKind::Photo,
        url: url.to_string(),
        caption: Some(caption.to_string()),
        thumbnail: None,
    }
}

fn location(city: &str, province: &str, lng: f64, lat: f64) -> ProjectLocation {
    ProjectLocation {
        city: city.to_string(),
        province: province.to_string(),
        coordinates: [lng, lat],
    }
}

fn comedor_san_martin() -> Project {
    Project {
        id: "1".to_string(),
        name: "Comedor Escolar San Martín".to_string(),
        description: "Construcción de un comedor escolar para 200 niños en situación de vulnerabilidad"
            .to_string(),
        problem_solved: "Desnutrición infantil en zonas rurales de Salta".to_string(),
        category: "Educación y Alimentación".to_string(),
        current_amount: 18_500,
        target_amount: 30_000,
        deadline: date(2025, 12, 15),
        location: location("Salta", "Salta", -65.4176, -24.7821),
        milestones: vec![
            milestone(
                "m1",
                "Preparación del terreno",
                "Limpieza y nivelación del terreno para construcción",
                (5_000, 5_000),
                Some(date(2025, 6, 15)),
                100,
            ),
            milestone(
                "m2",
                "Construcción de cimientos",
                "Excavación y construcción de la base del comedor",
                (8_000, 6_500),
                None,
                81,
            ),
            milestone(
                "m3",
                "Estructura y techo",
                "Construcción de paredes y colocación del techo",
                (12_000, 4_000),
                None,
                33,
            ),
            milestone(
                "m4",
                "Equipamiento y mobiliario",
                "Instalación de cocina, mesas y sillas",
                (5_000, 3_000),
                None,
                60,
            ),
        ],
        updates: vec![
            Update {
                id: "u1".to_string(),
                title: "¡Comenzamos la construcción!".to_string(),
                content: "Hoy iniciamos oficialmente la construcción del comedor escolar. Los niños están muy emocionados y las familias nos acompañan en este proceso.".to_string(),
                date: date(2025, 6, 1),
                image_url: Some("/construction-site-school-cafeteria.png".to_string()),
                milestone_id: None,
                media: vec![
                    photo("m1", "/construction-site-school-cafeteria.png", "Inicio de la construcción del comedor"),
                    photo("m2", "/excited-children-construction.png", "Los niños observando el inicio de las obras"),
                    photo("m3", "/construction-video-thumbnail.png", "Video del primer día de construcción"),
                ],
            },
            Update {
                id: "u2".to_string(),
                title: "Cimientos completados - Hito 1 alcanzado".to_string(),
                content: "¡Excelentes noticias! Terminamos la primera etapa según lo planificado. Los cimientos están sólidos y listos. Adjuntamos fotos del progreso como prueba del hito completado.".to_string(),
                date: date(2025, 6, 15),
                image_url: Some("/placeholder-2irmn.png".to_string()),
                milestone_id: Some("m1".to_string()),
                media: vec![
                    photo("m4", "/completed-concrete-foundation.png", "Cimientos completados y curados"),
                    photo("m5", "/foundation-measurements-verification.png", "Verificación de medidas y calidad"),
                    photo("m6", "/foundation-inspection.png", "Inspección técnica de los cimientos"),
                ],
            },
        ],
        image_url: "/school-cafeteria-construction-argentina.png".to_string(),
        organization_name: "Fundación Futuro Salta".to_string(),
        verified: true,
        donors_count: 127,
        days_left: 89,
    }
}

fn biblioteca_quilmes() -> Project {
    Project {
        id: "2".to_string(),
        name: "Biblioteca Comunitaria Quilmes".to_string(),
        description: "Creación de una biblioteca comunitaria con acceso a internet y programas de alfabetización".to_string(),
        problem_solved: "Falta de acceso a educación y tecnología en barrios periféricos".to_string(),
        category: "Educación y Tecnología".to_string(),
        current_amount: 12_300,
        target_amount: 25_000,
        deadline: date(2025, 11, 30),
        location: location("Quilmes", "Buenos Aires", -58.2543, -34.7203),
        milestones: vec![
            milestone(
                "m1",
                "Acondicionamiento del local",
                "Reparación y pintura del espacio destinado a biblioteca",
                (8_000, 8_000),
                Some(date(2025, 5, 20)),
                100,
            ),
            milestone(
                "m2",
                "Mobiliario y estanterías",
                "Compra e instalación de estanterías, mesas y sillas",
                (7_000, 4_300),
                None,
                61,
            ),
            milestone(
                "m3",
                "Equipos tecnológicos",
                "Computadoras, tablets y conexión a internet",
                (10_000, 0),
                None,
                0,
            ),
        ],
        updates: vec![Update {
            id: "u1".to_string(),
            title: "Local renovado y listo - Hito 1 completado".to_string(),
            content: "El espacio ya está completamente renovado. Las paredes lucen hermosas y el ambiente es perfecto para el aprendizaje. Compartimos el antes y después.".to_string(),
            date: date(2025, 5, 20),
            image_url: Some("/renovated-argentina-library.png".to_string()),
            milestone_id: Some("m1".to_string()),
            media: vec![
                photo("m7", "/pre-renovation-library.png", "Estado inicial del local"),
                photo("m8", "/renovated-argentina-library.png", "Local completamente renovado"),
                photo("m9", "/library-reading-area.png", "Área de lectura preparada"),
            ],
        }],
        image_url: "/community-library-buenos-aires.png".to_string(),
        organization_name: "Red de Bibliotecas Populares".to_string(),
        verified: true,
        donors_count: 89,
        days_left: 134,
    }
}

fn huerta_urbana() -> Project {
    Project {
        id: "3".to_string(),
        name: "Huerta Urbana Sustentable".to_string(),
        description: "Implementación de huertas urbanas en escuelas de Córdoba para educación ambiental".to_string(),
        problem_solved: "Falta de conciencia ambiental y acceso a alimentos frescos".to_string(),
        category: "Medio Ambiente".to_string(),
        current_amount: 8_750,
        target_amount: 15_000,
        deadline: date(2025, 10, 15),
        location: location("Córdoba", "Córdoba", -64.181, -31.4201),
        milestones: vec![
            milestone(
                "m1",
                "Diseño y planificación",
                "Diseño de las huertas y planificación pedagógica",
                (3_000, 3_000),
                Some(date(2025, 4, 10)),
                100,
            ),
            milestone(
                "m2",
                "Materiales y herramientas",
                "Compra de semillas, tierra, herramientas y sistemas de riego",
                (7_000, 5_750),
                None,
                82,
            ),
            milestone(
                "m3",
                "Implementación y capacitación",
                "Instalación de huertas y capacitación a docentes",
                (5_000, 0),
                None,
                0,
            ),
        ],
        updates: vec![Update {
            id: "u1".to_string(),
            title: "Diseños aprobados y materiales adquiridos".to_string(),
            content: "Los directivos y docentes aprobaron los diseños. Ya compramos las primeras semillas y herramientas. ¡Estamos listos para comenzar la implementación!".to_string(),
            date: date(2025, 4, 10),
            image_url: Some("/urban-garden-school-argentina.png".to_string()),
            milestone_id: Some("m1".to_string()),
            media: vec![
                photo("m10", "/urban-garden-school-argentina.png", "Planos aprobados de la huerta"),
                photo("m11", "/urban-garden-school-cordoba.png", "Semillas y herramientas adquiridas"),
                photo("m12", "/school-meeting-video.png", "Reunión con docentes y directivos"),
            ],
        }],
        image_url: "/urban-garden-school-cordoba.png".to_string(),
        organization_name: "EcoEducar Córdoba".to_string(),
        verified: true,
        donors_count: 64,
        days_left: 67,
    }
}
