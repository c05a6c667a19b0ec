
// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - feed_mock: Mocking ICS feeds to exercise the feed actor and its cache
// - smoke_tests: End-to-end aggregation over mocked feeds
// - web_tests: Driving the HTTP router without binding a socket
