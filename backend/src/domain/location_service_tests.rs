//! Tests for location confirmation, place voting, and meetup confirmation.

use rstest::rstest;

use super::*;
use crate::domain::geo::{Coordinate, TransportMode};
use crate::domain::{ErrorCode, InviteResponse, NotificationKind, Venue};
use crate::test_support::{
    Harness, ScriptedGeocoder, ScriptedIsochrones, ScriptedVenues, square_around,
};

const BASE_LNG: f64 = -0.1276;
const BASE_LAT: f64 = 51.5072;

/// Creator first, then the two guests.
const ADDRESSES: [&str; 3] = ["1 West Rd", "2 East Rd", "3 North Rd"];

fn at(dx: f64, dy: f64) -> Coordinate {
    Coordinate::new(BASE_LNG + dx, BASE_LAT + dy).expect("valid coordinate")
}

fn origins() -> [Coordinate; 3] {
    [at(-0.003, 0.0), at(0.003, 0.0), at(0.0, 0.003)]
}

fn venue(name: &str, location: Coordinate) -> Venue {
    Venue {
        name: name.to_owned(),
        address: format!("{name}, London"),
        location,
    }
}

/// Harness whose isochrones are squares of `half` degrees around each origin.
fn harness_with_reach(half: f64) -> Harness {
    let geocoder = ADDRESSES
        .iter()
        .zip(origins())
        .fold(ScriptedGeocoder::default(), |g, (address, origin)| {
            g.with(address, origin)
        });
    let isochrones = origins()
        .into_iter()
        .fold(ScriptedIsochrones::default(), |s, origin| {
            s.with(origin, square_around(origin, half))
        });
    let venues = ScriptedVenues::default()
        .with(venue("Corner Cafe", at(0.0, 0.0)))
        .with(venue("Canal Bistro", at(0.001, 0.001)))
        .with(venue("Far Diner", at(0.02, 0.0)));
    Harness::new(geocoder, isochrones, venues)
}

struct Group {
    members: [UserId; 3],
    hangout_id: HangoutId,
}

impl Group {
    fn creator(&self) -> &UserId {
        &self.members[0]
    }
}

/// Hangout in `confirm-time` with three active members.
async fn scheduled(harness: &Harness) -> Group {
    let members = [UserId::random(), UserId::random(), UserId::random()];
    let hangout = harness
        .hangouts
        .create_hangout(members[0].clone(), "Ada", "Dinner", members[1..].to_vec())
        .await
        .expect("hangout created");
    for guest in &members[1..] {
        harness
            .hangouts
            .respond_to_invite(hangout.id, guest, InviteResponse::Accept)
            .await
            .expect("invite accepted");
    }
    let options = harness
        .polls
        .create_poll(
            hangout.id,
            &members[0],
            vec!["2026-11-07,19:00,22:00".parse().expect("window")],
        )
        .await
        .expect("poll created");
    for member in &members {
        harness
            .polls
            .cast_votes(hangout.id, member, vec![options[0].id])
            .await
            .expect("vote cast");
    }
    Group {
        members,
        hangout_id: hangout.id,
    }
}

fn details(index: usize) -> LocationDetails {
    LocationDetails::new(ADDRESSES[index], "walking", 30).expect("valid details")
}

/// Hangout in `determining-location` with recommendations stored.
async fn voting(harness: &Harness) -> Group {
    let group = scheduled(harness).await;
    for (index, member) in group.members.iter().enumerate() {
        harness
            .locations
            .confirm_time(group.hangout_id, member, details(index))
            .await
            .expect("time confirmed");
    }
    group
}

/// Hangout in `confirm-meetup` after every member ranked the places.
async fn meetup(harness: &Harness) -> Group {
    let group = voting(harness).await;
    let places = harness
        .locations
        .get_recommendations(group.hangout_id)
        .await
        .expect("recommendations");
    for member in &group.members {
        harness
            .locations
            .submit_place_ranking(group.hangout_id, member, vec![(places[0].id, 1)])
            .await
            .expect("ranking stored");
    }
    group
}

fn count_of(harness: &Harness, kind: NotificationKind) -> usize {
    harness
        .store
        .notifications()
        .iter()
        .filter(|n| n.kind == kind)
        .count()
}

/// Details built without validation, as a caller might send them.
fn unchecked(address: &str, mode: &str, travel_minutes: u32) -> LocationDetails {
    LocationDetails {
        address: address.to_owned(),
        transport: TransportMode::new(mode).expect("mode"),
        travel_minutes,
    }
}

#[rstest]
#[case::too_long(unchecked("1 West Rd", "walking", 181))]
#[case::zero(unchecked("1 West Rd", "driving", 0))]
#[case::blank_address(unchecked("  ", "cycling", 20))]
#[tokio::test]
async fn confirm_time_rejects_invalid_details(#[case] bad: LocationDetails) {
    let harness = harness_with_reach(0.005);
    let group = scheduled(&harness).await;

    let err = harness
        .locations
        .confirm_time(group.hangout_id, group.creator(), bad)
        .await
        .expect_err("details rejected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(harness.geocoder.calls(), 0);
    assert_eq!(harness.isochrones.calls(), 0);
}

#[tokio::test]
async fn confirm_time_requires_the_confirm_phase() {
    let harness = harness_with_reach(0.005);
    let creator = UserId::random();
    let hangout = harness
        .hangouts
        .create_hangout(creator.clone(), "Ada", "Dinner", vec![UserId::random()])
        .await
        .expect("hangout created");

    let err = harness
        .locations
        .confirm_time(hangout.id, &creator, details(0))
        .await
        .expect_err("wrong phase");

    assert_eq!(err.code(), ErrorCode::InvalidState);
}

#[tokio::test]
async fn last_confirmation_runs_the_recommendations() {
    let harness = harness_with_reach(0.005);
    let group = scheduled(&harness).await;

    for (index, member) in group.members.iter().enumerate().take(2) {
        let hangout = harness
            .locations
            .confirm_time(group.hangout_id, member, details(index))
            .await
            .expect("time confirmed");
        assert_eq!(hangout.status, HangoutStatus::ConfirmTime);
    }
    assert_eq!(harness.geocoder.calls(), 0);

    let hangout = harness
        .locations
        .confirm_time(group.hangout_id, &group.members[2], details(2))
        .await
        .expect("time confirmed");

    assert_eq!(hangout.status, HangoutStatus::DeterminingLocation);
    let names: Vec<_> = harness
        .locations
        .get_recommendations(group.hangout_id)
        .await
        .expect("recommendations")
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["Corner Cafe", "Canal Bistro"]);
    assert_eq!(harness.isochrones.calls(), 3);
    assert_eq!(count_of(&harness, NotificationKind::SelectPlaces), 3);
    let participants = harness
        .hangouts
        .list_participants(group.hangout_id)
        .await
        .expect("participants");
    assert!(
        participants
            .iter()
            .all(|p| p.flow == FlowStatus::PendingLocationVote)
    );
}

#[tokio::test]
async fn disjoint_reach_reports_no_overlap_and_can_be_rerun() {
    let harness = harness_with_reach(0.001);
    let group = scheduled(&harness).await;
    for (index, member) in group.members.iter().enumerate().take(2) {
        harness
            .locations
            .confirm_time(group.hangout_id, member, details(index))
            .await
            .expect("time confirmed");
    }

    let err = harness
        .locations
        .confirm_time(group.hangout_id, &group.members[2], details(2))
        .await
        .expect_err("no overlap");

    assert_eq!(err.code(), ErrorCode::NoResult);
    let hangout = harness
        .hangouts
        .get_hangout(group.hangout_id)
        .await
        .expect("hangout");
    assert_eq!(hangout.status, HangoutStatus::DeterminingLocation);
    assert_eq!(count_of(&harness, NotificationKind::SelectPlaces), 0);

    let retry = harness
        .locations
        .rerun_recommendations(group.hangout_id)
        .await
        .expect_err("still no overlap");
    assert_eq!(retry.code(), ErrorCode::NoResult);
    assert_eq!(harness.venues.calls(), 0);
}

#[tokio::test]
async fn rerun_replaces_recommendations_and_rankings() {
    let harness = harness_with_reach(0.005);
    let group = voting(&harness).await;
    let before = harness
        .locations
        .get_recommendations(group.hangout_id)
        .await
        .expect("recommendations");
    harness
        .locations
        .submit_place_ranking(group.hangout_id, group.creator(), vec![(before[0].id, 1)])
        .await
        .expect("ranking stored");

    let after = harness
        .locations
        .rerun_recommendations(group.hangout_id)
        .await
        .expect("rerun");

    assert_eq!(after.len(), before.len());
    assert!(after.iter().all(|r| before.iter().all(|b| b.id != r.id)));
    let err = harness
        .locations
        .submit_place_ranking(group.hangout_id, group.creator(), vec![(before[0].id, 1)])
        .await
        .expect_err("stale place");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn rankings_wait_for_place_voting() {
    let harness = harness_with_reach(0.005);
    let group = scheduled(&harness).await;

    let err = harness
        .locations
        .submit_place_ranking(
            group.hangout_id,
            group.creator(),
            vec![(RecommendationId::new(1), 1)],
        )
        .await
        .expect_err("voting not open");

    assert_eq!(err.code(), ErrorCode::InvalidState);
}

#[rstest]
#[case::gap(vec![(1, 1), (2, 3)])]
#[case::repeated_rank(vec![(1, 1), (2, 1)])]
#[case::empty(vec![])]
#[tokio::test]
async fn malformed_rankings_are_rejected(#[case] raw: Vec<(i64, u32)>) {
    let harness = harness_with_reach(0.005);
    let group = voting(&harness).await;
    let entries = raw
        .into_iter()
        .map(|(id, rank)| (RecommendationId::new(id), rank))
        .collect();

    let err = harness
        .locations
        .submit_place_ranking(group.hangout_id, group.creator(), entries)
        .await
        .expect_err("ranking rejected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn borda_winner_becomes_the_meetup_place() {
    let harness = harness_with_reach(0.005);
    let group = voting(&harness).await;
    let places = harness
        .locations
        .get_recommendations(group.hangout_id)
        .await
        .expect("recommendations");
    let (cafe, bistro) = (places[0].id, places[1].id);
    let ballots = [
        vec![(bistro, 1), (cafe, 2)],
        vec![(bistro, 1), (cafe, 2)],
        vec![(cafe, 1), (bistro, 2)],
    ];

    let mut last = None;
    for (member, ballot) in group.members.iter().zip(ballots) {
        last = Some(
            harness
                .locations
                .submit_place_ranking(group.hangout_id, member, ballot)
                .await
                .expect("ranking stored"),
        );
    }

    let hangout = last.expect("final ranking");
    assert_eq!(hangout.status, HangoutStatus::ConfirmMeetup);
    assert_eq!(hangout.chosen_place, Some(bistro));
    let notice = harness
        .store
        .notifications()
        .into_iter()
        .find(|n| n.kind == NotificationKind::ConfirmMeetup)
        .expect("confirm-meetup notice");
    assert_eq!(notice.message, "Confirm the meetup for Dinner at Canal Bistro");
}

#[tokio::test]
async fn a_revised_ranking_replaces_the_earlier_one() {
    let harness = harness_with_reach(0.005);
    let group = voting(&harness).await;
    let places = harness
        .locations
        .get_recommendations(group.hangout_id)
        .await
        .expect("recommendations");
    let (cafe, bistro) = (places[0].id, places[1].id);
    let [first, second, third] = &group.members;
    let ballots = [
        (first, vec![(cafe, 1), (bistro, 2)]),
        (first, vec![(bistro, 1)]),
        (second, vec![(bistro, 1), (cafe, 2)]),
        (third, vec![(cafe, 1), (bistro, 2)]),
    ];

    let mut last = None;
    for (member, ballot) in ballots {
        last = Some(
            harness
                .locations
                .submit_place_ranking(group.hangout_id, member, ballot)
                .await
                .expect("ranking stored"),
        );
    }

    let hangout = last.expect("final ranking");
    assert_eq!(hangout.status, HangoutStatus::ConfirmMeetup);
    assert_eq!(hangout.chosen_place, Some(bistro));
}

#[tokio::test]
async fn rankings_from_members_who_left_are_ignored() {
    let harness = harness_with_reach(0.005);
    let group = voting(&harness).await;
    let places = harness
        .locations
        .get_recommendations(group.hangout_id)
        .await
        .expect("recommendations");
    let (cafe, bistro) = (places[0].id, places[1].id);
    let [creator, guest, leaver] = &group.members;

    harness
        .locations
        .submit_place_ranking(group.hangout_id, leaver, vec![(bistro, 1), (cafe, 2)])
        .await
        .expect("leaver ranks");
    harness
        .hangouts
        .leave_hangout(group.hangout_id, leaver)
        .await
        .expect("guest leaves");
    harness
        .locations
        .submit_place_ranking(group.hangout_id, creator, vec![(cafe, 1), (bistro, 2)])
        .await
        .expect("creator ranks");
    let hangout = harness
        .locations
        .submit_place_ranking(group.hangout_id, guest, vec![(bistro, 1), (cafe, 2)])
        .await
        .expect("guest ranks");

    assert_eq!(hangout.status, HangoutStatus::ConfirmMeetup);
    assert_eq!(hangout.chosen_place, Some(cafe));
}

#[tokio::test]
async fn everyone_accepting_confirms_the_meetup() {
    let harness = harness_with_reach(0.005);
    let group = meetup(&harness).await;

    for member in &group.members {
        harness
            .locations
            .confirm_meetup(group.hangout_id, member, true)
            .await
            .expect("meetup accepted");
    }

    let hangout = harness
        .hangouts
        .get_hangout(group.hangout_id)
        .await
        .expect("hangout");
    assert_eq!(hangout.status, HangoutStatus::Confirmed);
    assert_eq!(count_of(&harness, NotificationKind::MeetupConfirmed), 3);
}

#[tokio::test]
async fn declining_the_meetup_leaves_the_rest_confirmed() {
    let harness = harness_with_reach(0.005);
    let group = meetup(&harness).await;

    harness
        .locations
        .confirm_meetup(group.hangout_id, &group.members[0], true)
        .await
        .expect("creator accepts");
    harness
        .locations
        .confirm_meetup(group.hangout_id, &group.members[1], true)
        .await
        .expect("guest accepts");
    let hangout = harness
        .locations
        .confirm_meetup(group.hangout_id, &group.members[2], false)
        .await
        .expect("guest declines");

    assert_eq!(hangout.status, HangoutStatus::Confirmed);
    let remaining = harness
        .hangouts
        .list_participants(group.hangout_id)
        .await
        .expect("participants");
    assert_eq!(remaining.len(), 2);
}

#[tokio::test]
async fn creator_left_alone_declines_the_meetup() {
    let harness = harness_with_reach(0.005);
    let group = meetup(&harness).await;

    for guest in &group.members[1..] {
        harness
            .locations
            .confirm_meetup(group.hangout_id, guest, false)
            .await
            .expect("guest declines");
    }

    let hangout = harness
        .hangouts
        .get_hangout(group.hangout_id)
        .await
        .expect("hangout");
    assert_eq!(hangout.status, HangoutStatus::Declined);
}

#[tokio::test]
async fn creator_cannot_decline_the_meetup() {
    let harness = harness_with_reach(0.005);
    let group = meetup(&harness).await;

    let err = harness
        .locations
        .confirm_meetup(group.hangout_id, group.creator(), false)
        .await
        .expect_err("creator must cancel instead");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
