use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Course, Department, ExamType, Semester};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DepartmentCreate {
    #[validate(length(min = 1, max = 16, message = "code must be 1-16 characters"))]
    pub(crate) code: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[serde(alias = "departmentId")]
    pub(crate) department_id: String,
    #[validate(length(min = 1, max = 16, message = "code must be 1-16 characters"))]
    pub(crate) code: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SemesterCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "position must be non-negative"))]
    pub(crate) position: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamTypeCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
}

// Catalog responses are cached in redis as JSON, so they deserialize too.

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DepartmentResponse {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
}

impl DepartmentResponse {
    pub(crate) fn from_db(department: Department) -> Self {
        Self {
            id: department.id,
            code: department.code,
            name: department.name,
            created_at: format_primitive(department.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) department_id: String,
    pub(crate) code: String,
    pub(crate) title: String,
    pub(crate) created_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            department_id: course.department_id,
            code: course.code,
            title: course.title,
            created_at: format_primitive(course.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SemesterResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) position: i32,
    pub(crate) created_at: String,
}

impl SemesterResponse {
    pub(crate) fn from_db(semester: Semester) -> Self {
        Self {
            id: semester.id,
            name: semester.name,
            position: semester.position,
            created_at: format_primitive(semester.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ExamTypeResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
}

impl ExamTypeResponse {
    pub(crate) fn from_db(exam_type: ExamType) -> Self {
        Self {
            id: exam_type.id,
            name: exam_type.name,
            created_at: format_primitive(exam_type.created_at),
        }
    }
}
