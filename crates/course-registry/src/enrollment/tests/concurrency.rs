use std::sync::{Arc, Barrier};
use std::thread;

use super::common::*;
use crate::enrollment::domain::{CourseId, Enrollment, EnrollmentType};

fn register_concurrently(
    harness: &Harness,
    course_id: &CourseId,
    students: usize,
) -> Vec<Enrollment> {
    let barrier = Arc::new(Barrier::new(students));
    let workers: Vec<_> = (0..students)
        .map(|index| {
            let service = Arc::clone(&harness.service);
            let barrier = Arc::clone(&barrier);
            let course_id = course_id.clone();
            thread::spawn(move || {
                barrier.wait();
                service
                    .register_student(student(&format!("stu-{index:03}")), course_id)
                    .expect("registration succeeds")
            })
        })
        .collect();

    workers
        .into_iter()
        .map(|worker| worker.join().expect("worker panicked"))
        .collect()
}

#[test]
fn simultaneous_registrations_never_oversell() {
    let (harness, course_id) = harness_with_course("POOL-1", 5);
    let results = register_concurrently(&harness, &course_id, 24);

    let enrolled: Vec<&Enrollment> = results
        .iter()
        .filter(|record| record.enrollment_type == EnrollmentType::Enrolled)
        .collect();
    let waitlisted: Vec<&Enrollment> = results
        .iter()
        .filter(|record| record.enrollment_type == EnrollmentType::Waitlisted)
        .collect();
    assert_eq!(enrolled.len(), 5);
    assert_eq!(waitlisted.len(), 19);

    let capacity = harness.service.course_capacity(&course_id).expect("capacity");
    assert_eq!(capacity.current_enrollment, capacity.max_capacity);
    assert_eq!(capacity.waitlist_length, 19);

    // Identifiers are issued under the course lock, so queue order follows issue order.
    let queue = assert_contiguous_waitlist(&harness.enrollments, &course_id);
    let mut sorted = queue.clone();
    sorted.sort();
    assert_eq!(queue, sorted);
    let last_admitted = enrolled
        .iter()
        .map(|record| record.enrollment_id.clone())
        .max()
        .expect("some admitted");
    assert!(queue.iter().all(|id| *id > last_admitted));

    harness.service.audit_course(&course_id).expect("consistent");
}

#[test]
fn concurrent_withdrawals_promote_each_freed_seat_once() {
    let (harness, course_id) = harness_with_course("POOL-2", 4);
    let results = register_concurrently(&harness, &course_id, 12);
    let admitted: Vec<Enrollment> = results
        .into_iter()
        .filter(|record| record.enrollment_type == EnrollmentType::Enrolled)
        .collect();

    let barrier = Arc::new(Barrier::new(admitted.len()));
    let workers: Vec<_> = admitted
        .into_iter()
        .map(|record| {
            let service = Arc::clone(&harness.service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service
                    .withdraw(&record.enrollment_id)
                    .expect("withdraw")
                    .promoted
                    .len()
            })
        })
        .collect();
    let promoted: usize = workers
        .into_iter()
        .map(|worker| worker.join().expect("worker panicked"))
        .sum();

    assert_eq!(promoted, 4);
    let capacity = harness.service.course_capacity(&course_id).expect("capacity");
    assert_eq!(capacity.current_enrollment, 4);
    assert_eq!(capacity.waitlist_length, 4);
    assert_contiguous_waitlist(&harness.enrollments, &course_id);
    harness.service.audit_course(&course_id).expect("consistent");
}

#[test]
fn separate_courses_fill_independently() {
    let harness = harness();
    let course_ids: Vec<CourseId> = (0..4)
        .map(|index| {
            harness
                .service
                .open_course(course(&format!("SEC-{index}"), 3))
                .expect("open")
                .course_id
        })
        .collect();

    let barrier = Arc::new(Barrier::new(course_ids.len() * 6));
    let mut workers = Vec::new();
    for course_id in &course_ids {
        for index in 0..6 {
            let service = Arc::clone(&harness.service);
            let barrier = Arc::clone(&barrier);
            let course_id = course_id.clone();
            workers.push(thread::spawn(move || {
                barrier.wait();
                service
                    .register_student(student(&format!("{course_id}-{index}")), course_id)
                    .expect("registration succeeds")
            }));
        }
    }
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    for course_id in &course_ids {
        let capacity = harness.service.course_capacity(course_id).expect("capacity");
        assert_eq!(capacity.current_enrollment, 3);
        assert_eq!(capacity.waitlist_length, 3);
        assert_contiguous_waitlist(&harness.enrollments, course_id);
    }
}
