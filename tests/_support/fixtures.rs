#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use school_query::{QueryEnum, Record, RecordShape};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estado {
    Borrador,
    Publicada,
    Anulada,
}

impl QueryEnum for Estado {
    const VARIANTS: school_query::types::EnumVariants =
        &[("Borrador", 0), ("Publicada", 1), ("Anulada", 2)];

    fn ordinal(&self) -> i64 {
        match self {
            Self::Borrador => 0,
            Self::Publicada => 1,
            Self::Anulada => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profesor {
    pub id: i32,
    pub nombre: String,
    pub apellido: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub id: i32,
    pub nombre: String,
    pub valor: Decimal,
    pub id_profesor: i32,
    pub id_estudiante: i64,
    pub fecha: NaiveDateTime,
    pub estado: Estado,
    pub aprobado: bool,
    pub observacion: Option<String>,
    pub profesor: Option<Profesor>,
}

impl Profesor {
    pub fn shape() -> &'static RecordShape<Profesor> {
        static SHAPE: OnceLock<RecordShape<Profesor>> = OnceLock::new();
        SHAPE.get_or_init(|| {
            RecordShape::builder("Profesor")
                .int("Id", |p: &Profesor| p.id)
                .string("Nombre", |p: &Profesor| p.nombre.as_str())
                .string("Apellido", |p: &Profesor| p.apellido.as_str())
                .build()
        })
    }
}

impl Record for Grade {
    fn shape() -> &'static RecordShape<Self> {
        static SHAPE: OnceLock<RecordShape<Grade>> = OnceLock::new();
        SHAPE.get_or_init(|| {
            RecordShape::builder("Grade")
                .int("Id", |g: &Grade| g.id)
                .string("Nombre", |g: &Grade| g.nombre.as_str())
                .decimal("Valor", |g: &Grade| g.valor)
                .int("IdProfesor", |g: &Grade| g.id_profesor)
                .long("IdEstudiante", |g: &Grade| g.id_estudiante)
                .datetime("Fecha", |g: &Grade| g.fecha)
                .enumeration("Estado", |g: &Grade| g.estado)
                .boolean("Aprobado", |g: &Grade| g.aprobado)
                .opt_string("Observacion", |g: &Grade| g.observacion.as_deref())
                .nested("Profesor", Profesor::shape(), |g: &Grade| g.profesor.as_ref())
                .build()
        })
    }
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
}

fn profesor(id: i32, nombre: &str, apellido: &str) -> Option<Profesor> {
    Some(Profesor { id, nombre: nombre.into(), apellido: apellido.into() })
}

/// Five grades in insertion order:
/// Juan Pérez 10.5, María García 25.0, Carlos López 15.75, Ana Martín 30.25, Luis González 5.5.
pub fn grades() -> Vec<Grade> {
    vec![
        Grade {
            id: 1,
            nombre: "Juan Pérez".into(),
            valor: Decimal::new(105, 1),
            id_profesor: 1,
            id_estudiante: 100,
            fecha: at(2024, 3, 1, 9),
            estado: Estado::Publicada,
            aprobado: false,
            observacion: Some("Recuperación pendiente".into()),
            profesor: profesor(1, "Rosa", "Díaz"),
        },
        Grade {
            id: 2,
            nombre: "María García".into(),
            valor: Decimal::new(250, 1),
            id_profesor: 2,
            id_estudiante: 101,
            fecha: at(2024, 3, 5, 10),
            estado: Estado::Publicada,
            aprobado: true,
            observacion: None,
            profesor: profesor(2, "Ramón", "Ruiz"),
        },
        Grade {
            id: 3,
            nombre: "Carlos López".into(),
            valor: Decimal::new(1575, 2),
            id_profesor: 1,
            id_estudiante: 102,
            fecha: at(2024, 4, 12, 11),
            estado: Estado::Borrador,
            aprobado: true,
            observacion: None,
            profesor: profesor(1, "Rosa", "Díaz"),
        },
        Grade {
            id: 4,
            nombre: "Ana Martín".into(),
            valor: Decimal::new(3025, 2),
            id_profesor: 2,
            id_estudiante: 103,
            fecha: at(2024, 5, 20, 12),
            estado: Estado::Anulada,
            aprobado: true,
            observacion: Some("Revisada".into()),
            profesor: profesor(2, "Ramón", "Ruiz"),
        },
        Grade {
            id: 5,
            nombre: "Luis González".into(),
            valor: Decimal::new(55, 1),
            id_profesor: 3,
            id_estudiante: 104,
            fecha: at(2024, 6, 2, 13),
            estado: Estado::Borrador,
            aprobado: false,
            observacion: None,
            profesor: None,
        },
    ]
}

pub fn names<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Grade>,
{
    records.into_iter().map(|g| g.nombre.clone()).collect()
}
