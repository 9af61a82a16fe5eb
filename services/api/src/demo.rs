use crate::infra::{in_memory_service, InMemoryEnrollmentService};
use crate::routes::open_catalog;
use clap::Args;
use course_registry::catalog::CourseCatalogImporter;
use course_registry::config::AdmissionConfig;
use course_registry::enrollment::{
    CourseCapacityView, CourseId, CourseOffering, Enrollment, EnrollmentType, Money,
    PaymentMethod, PaymentSubmission, PaymentType, SemesterId, StudentId,
};
use course_registry::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Course catalog CSV (Course ID,Title,Semester,Capacity,Fee). Defaults to a built-in term.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Override every course's seat limit.
    #[arg(long)]
    pub(crate) capacity: Option<u32>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { catalog, capacity } = args;

    let mut courses = match catalog {
        Some(path) => CourseCatalogImporter::from_path(path)?,
        None => default_catalog(),
    };
    if let Some(capacity) = capacity {
        for course in &mut courses {
            course.max_capacity = capacity;
        }
    }

    let service = in_memory_service(AdmissionConfig::default());
    let imported = open_catalog(&service, courses);

    println!("Course registration demo");
    for course in &imported.opened {
        println!(
            "  opened {} ({}) seats={} fee={}",
            course.course_id, course.title, course.max_capacity, course.fee
        );
    }
    for skipped in &imported.skipped {
        println!("  skipped {}: {}", skipped.course_id, skipped.reason);
    }

    let Some(course) = imported.opened.first() else {
        println!("No courses opened; nothing to demonstrate.");
        return Ok(());
    };
    run_scenarios(&service, course)
}

fn run_scenarios(
    service: &InMemoryEnrollmentService,
    course: &CourseOffering,
) -> Result<(), AppError> {
    let course_id = &course.course_id;
    let applicants = course.max_capacity.saturating_add(3);

    println!("\nRegistering {applicants} students for {course_id}");
    let mut roster = Vec::new();
    for index in 1..=applicants {
        let enrollment =
            service.register_student(StudentId::new(format!("stu-{index:02}")), course_id.clone())?;
        println!("  {}", describe(&enrollment));
        roster.push(enrollment);
    }
    print_capacity(&service.course_capacity(course_id)?);

    println!("\nDuplicate registration attempt");
    if let Err(err) = service.register_student(roster[0].student_id.clone(), course_id.clone()) {
        println!("  rejected: {err}");
    }

    if let Some(first) = roster
        .iter()
        .find(|enrollment| enrollment.enrollment_type == EnrollmentType::Enrolled)
    {
        println!("\n{} withdraws", first.student_id);
        let outcome = service.withdraw(&first.enrollment_id)?;
        for promoted in &outcome.promoted {
            println!("  promoted {}", promoted.student_id);
        }
        print_waitlist(service, course_id)?;
    }

    if let Some(head) = service.get_waitlist(course_id)?.first() {
        println!("\n{} leaves the waitlist", head.student_id);
        service.withdraw(&head.enrollment_id)?;
        print_waitlist(service, course_id)?;
    }

    let grown = course.max_capacity.saturating_add(1);
    println!("\nCapacity raised to {grown}");
    let change = service.resize_capacity(course_id, grown)?;
    for promoted in &change.promoted {
        println!("  promoted {}", promoted.student_id);
    }
    print_capacity(&change.capacity);

    if let Some(payer) = change.promoted.first().or_else(|| {
        roster
            .iter()
            .find(|enrollment| enrollment.enrollment_type == EnrollmentType::Enrolled)
    }) {
        let partial = Money::from_cents(payer.fee_amount.cents() / 2);
        if !partial.is_zero() {
            service.record_payment(PaymentSubmission {
                student_id: payer.student_id.clone(),
                amount: partial,
                method: PaymentMethod::Card,
                payment_type: PaymentType::CourseFee,
                enrollment_id: Some(payer.enrollment_id.clone()),
                paid_on: None,
            })?;
        }
        let status = service.enrollment_status(&payer.enrollment_id)?;
        println!(
            "\nFees for {}: fee={} paid={} due={} status={}",
            payer.student_id,
            status.fees.fee_amount,
            status.fees.amount_paid,
            status.fees.balance_due,
            status.fees.payment_status.label()
        );
    }

    let audited = service.audit_course(course_id)?;
    println!(
        "\nLedger audit passed for {} ({} enrolled, {} waitlisted)",
        audited.course_id, audited.current_enrollment, audited.waitlist_length
    );
    Ok(())
}

fn describe(enrollment: &Enrollment) -> String {
    match enrollment.waitlist_position {
        Some(position) => format!(
            "{} -> waitlisted #{position} ({})",
            enrollment.student_id, enrollment.enrollment_id
        ),
        None => format!(
            "{} -> {} ({})",
            enrollment.student_id, enrollment.enrollment_type, enrollment.enrollment_id
        ),
    }
}

fn print_capacity(view: &CourseCapacityView) {
    println!(
        "  {}: {}/{} seats taken, {} open, {} waitlisted{}",
        view.course_id,
        view.current_enrollment,
        view.max_capacity,
        view.available_spots,
        view.waitlist_length,
        if view.is_full { " [full]" } else { "" }
    );
}

fn print_waitlist(
    service: &InMemoryEnrollmentService,
    course_id: &CourseId,
) -> Result<(), AppError> {
    let waitlist = service.get_waitlist(course_id)?;
    if waitlist.is_empty() {
        println!("  waitlist empty");
    }
    for entry in waitlist {
        println!("  #{} {}", entry.position, entry.student_id);
    }
    Ok(())
}

fn default_catalog() -> Vec<CourseOffering> {
    vec![
        CourseOffering {
            course_id: CourseId::new("SWIM-101"),
            title: "Beginner Swim".to_string(),
            semester_id: SemesterId::new("2025-FALL"),
            max_capacity: 2,
            fee: Money::from_cents(12_500),
        },
        CourseOffering {
            course_id: CourseId::new("ART-200"),
            title: "Watercolor Basics".to_string(),
            semester_id: SemesterId::new("2025-FALL"),
            max_capacity: 4,
            fee: Money::from_cents(8_000),
        },
    ]
}
