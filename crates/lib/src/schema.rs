//! # Schema Description
//!
//! The fixed, human-readable description of the database handed to the NL-to-SQL
//! collaborator. It is prompt context only and is never parsed.

pub const SCHEMA_DESCRIPTION: &str = r#"The database consists of four tables: departments, employees, orders, and products.
- "departments" (id INTEGER PRIMARY KEY, name TEXT NOT NULL).
- "employees" (id INTEGER PRIMARY KEY, name TEXT NOT NULL, department_id INTEGER REFERENCES departments(id), email TEXT UNIQUE NOT NULL, salary REAL NOT NULL).
- "orders" (id INTEGER PRIMARY KEY, customer_name TEXT NOT NULL, employee_id INTEGER REFERENCES employees(id), order_total REAL NOT NULL, order_date TEXT NOT NULL as YYYY-MM-DD, embedding BLOB holding a 768-dimension float32 vector).
- "products" (id INTEGER PRIMARY KEY, name TEXT NOT NULL, price REAL NOT NULL, embedding BLOB holding a 768-dimension float32 vector).

Relationships: employees.department_id -> departments.id (each employee belongs to a department), orders.employee_id -> employees.id (each order is handled by an employee).

The embedding columns are reserved for vector similarity search and must not be selected, filtered, or compared in generated queries."#;
